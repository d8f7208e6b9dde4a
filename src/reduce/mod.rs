pub mod dom_cand;
pub mod dom_check;
pub mod reducer;

pub use dom_cand::dom_candidates;
pub use dom_check::{trivial_check, DomChecker, FfrDomChecker};
pub use reducer::{reduce, ReduceStats};
