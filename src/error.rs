//! Error taxonomy for the library surface. CLI argument parsing is handled
//! separately by `clap`; `CoreError` covers everything the engine itself can
//! fail with once it has a netlist and a request to act on.

use std::fmt;

/// Errors the ATPG engine can surface. I/O is deliberately not a first-class
/// variant here: reading and writing design/pattern files is the CLI's
/// concern, and `io::*` functions report failures through `std::io::Error`
/// directly.
#[derive(Debug)]
pub enum CoreError {
    /// A request was malformed: e.g. a fault id out of range, or a config
    /// combination the engine does not support.
    Argument(String),
    /// The underlying SAT solver reported an internal failure (as opposed to
    /// a plain UNSAT, which is a normal [`crate::sat::SatResult::False`]).
    SatAbort(String),
    /// The netlist violates an invariant the engine relies on (not
    /// topologically valid, a signal reference out of range, and so on).
    InvalidNetlist(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::Argument(s) => write!(f, "invalid argument: {}", s),
            CoreError::SatAbort(s) => write!(f, "SAT solver aborted: {}", s),
            CoreError::InvalidNetlist(s) => write!(f, "invalid netlist: {}", s),
        }
    }
}

impl std::error::Error for CoreError {}
