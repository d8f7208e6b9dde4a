//! Small formatting helpers shared by the `.bench` reader/writer.

use crate::network::{Gate, Network, Signal};
use std::collections::HashSet;

/// Render a signal the way `.bench` files name it: `gnd`/`vdd` for the
/// constants, `xN` for a gate output, `iN` for a primary input, with a `_n`
/// suffix for an inverted reference (ISCAS files have no inline negation
/// operator, so an inverted signal is exported as a separate `NOT` gate).
pub fn sig_to_string(s: &Signal) -> String {
    if *s == Signal::one() {
        return "vdd".to_string();
    }
    if *s == Signal::zero() {
        return "gnd".to_string();
    }
    let base = if s.is_input() {
        format!("i{}", s.input())
    } else {
        format!("x{}", s.var())
    };
    if s.is_inverted() {
        base + "_n"
    } else {
        base
    }
}

/// Every signal referenced inverted somewhere in `network`, in canonical
/// (uninverted) form, sorted for deterministic output. The `.bench` writer
/// emits one `_n = NOT(...)` statement per entry.
pub fn get_inverted_signals(network: &Network) -> Vec<Signal> {
    let mut with_inv = HashSet::new();
    for o in 0..network.nb_outputs() {
        let s = network.output(o);
        if s.is_inverted() && !s.is_constant() {
            with_inv.insert(!s);
        }
    }
    for i in 0..network.nb_nodes() {
        if matches!(network.gate(i), Gate::Buf(_)) {
            // Buf(!x) is exported directly as a NOT, not as a NOT-suffixed alias.
            continue;
        }
        for s in network.gate(i).dependencies() {
            if s.is_inverted() && !s.is_constant() {
                with_inv.insert(!s);
            }
        }
    }
    let mut out: Vec<Signal> = with_inv.into_iter().collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sig_to_string_constants() {
        assert_eq!(sig_to_string(&Signal::one()), "vdd");
        assert_eq!(sig_to_string(&Signal::zero()), "gnd");
    }

    #[test]
    fn test_sig_to_string_inverted_var() {
        let s = !Signal::from_var(3);
        assert_eq!(sig_to_string(&s), "x3_n");
    }

    #[test]
    fn test_get_inverted_signals() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], !inputs[1]);
        net.add_output(a);
        let inv = get_inverted_signals(&net);
        assert_eq!(inv, vec![inputs[1]]);
    }
}
