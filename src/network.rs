//! Gate-level network representation: signals, gates, the network graph
//! itself, and the FFR/MFFC netlist view built on top of it.

pub mod gates;
pub mod netlist;
pub mod network;
pub mod signal;
pub mod stats;

pub use gates::{BinaryType, Gate, NaryType, TernaryType};
pub use netlist::{Ffr, FfrId, Mffc, MffcId, Netlist, NodeId};
pub use network::Network;
pub use signal::Signal;
