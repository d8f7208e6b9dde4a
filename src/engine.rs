//! Structural SAT encoding of the good circuit.

pub mod struct_engine;
pub mod subenc;

pub use struct_engine::{StructEngine, TimeFrame};
pub use subenc::{Scope, SubEnc};
