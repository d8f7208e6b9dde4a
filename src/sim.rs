//! Good-circuit and fault simulation, bit-parallel over 3-valued packed
//! words.

pub mod eval;
pub mod fault_sim;
pub mod packed;
pub mod simple;

pub use fault_sim::FaultSimulator;
pub use packed::{PackedVal, PV_BITLEN};
pub use simple::simulate;
