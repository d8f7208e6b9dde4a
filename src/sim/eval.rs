//! Shared combinational gate evaluation over [`PackedVal`]s, used by both the
//! good-circuit simulator and the fault simulator.

use super::packed::PackedVal;
use crate::network::{BinaryType, Gate, NaryType, TernaryType};

/// Evaluate a combinational gate given the already-computed values of its
/// fanins, in the same order as [`Gate::dependencies`](crate::network::Gate).
/// Flip-flops are not combinational and must be handled by the caller, which
/// knows the previous-frame state.
pub fn eval_comb(gate: &Gate, fanins: &[PackedVal]) -> PackedVal {
    match gate {
        Gate::Binary(_, BinaryType::And) => fanins[0].and(&fanins[1]),
        Gate::Binary(_, BinaryType::Xor) => fanins[0].xor(&fanins[1]),
        Gate::Ternary(_, TernaryType::And) => fanins[0].and(&fanins[1]).and(&fanins[2]),
        Gate::Ternary(_, TernaryType::Xor) => fanins[0].xor(&fanins[1]).xor(&fanins[2]),
        Gate::Ternary(_, TernaryType::Maj) => fanins[0].maj(&fanins[1], &fanins[2]),
        Gate::Ternary(_, TernaryType::Mux) => fanins[1].mux(&fanins[0], &fanins[2]),
        Gate::Nary(_, NaryType::And) => fanins.iter().fold(PackedVal::all_one(), |a, b| a.and(b)),
        Gate::Nary(_, NaryType::Or) => fanins.iter().fold(PackedVal::all_zero(), |a, b| a.or(b)),
        Gate::Nary(_, NaryType::Nand) => !fanins.iter().fold(PackedVal::all_one(), |a, b| a.and(b)),
        Gate::Nary(_, NaryType::Nor) => !fanins.iter().fold(PackedVal::all_zero(), |a, b| a.or(b)),
        Gate::Nary(_, NaryType::Xor) => fanins.iter().fold(PackedVal::all_zero(), |a, b| a.xor(b)),
        Gate::Nary(_, NaryType::Xnor) => !fanins.iter().fold(PackedVal::all_zero(), |a, b| a.xor(b)),
        Gate::Buf(_) => fanins[0],
        Gate::Dff(_) => panic!("eval_comb called on a sequential Dff gate"),
    }
}

/// Invert `v` if `inverted` is set, the bookkeeping every signal reference
/// needs applied after reading a fanin's packed value.
pub fn apply_inversion(v: PackedVal, inverted: bool) -> PackedVal {
    if inverted {
        !v
    } else {
        v
    }
}
