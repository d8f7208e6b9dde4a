//! Simulation-derived dominance candidates: `f1` is a candidate dominator of
//! `f2` when every pattern in the sample that detects `f2` also detects
//! `f1`. This is a necessary but not sufficient condition for true fault
//! dominance (SAT confirmation is [`super::dom_check`]'s job); it exists to
//! cut the quadratic number of pairs the SAT checker would otherwise have to
//! consider down to the ones simulation cannot already rule out.

use crate::fault::{Fault, FaultId};
use crate::network::Netlist;
use crate::sim::FaultSimulator;
use crate::testvector::TestVector;
use fxhash::FxHashMap;

/// One bit per sample pattern, `true` where that pattern detects the fault.
struct DetectSet {
    bits: Vec<u64>,
}

impl DetectSet {
    fn from_flags(flags: &[bool]) -> DetectSet {
        let nb_words = flags.len().div_ceil(64);
        let mut bits = vec![0u64; nb_words];
        for (i, &b) in flags.iter().enumerate() {
            if b {
                bits[i / 64] |= 1u64 << (i % 64);
            }
        }
        DetectSet { bits }
    }

    /// `true` if every bit set in `other` is also set in `self`, i.e. `self`
    /// detects at least every pattern `other` does.
    fn superset_of(&self, other: &DetectSet) -> bool {
        self.bits.iter().zip(other.bits.iter()).all(|(&a, &b)| (a & b) == b)
    }

    fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }
}

/// Runs PPSFP over `patterns` for every fault in `faults` and returns, for
/// each fault id, the ids of the faults that are candidate dominators of it
/// (their detect set is a superset of this fault's). A fault with an empty
/// detect set contributes no candidates either way, since simulation alone
/// cannot say anything about an undetected fault's dominance relationships.
pub fn dom_candidates(
    netlist: &Netlist,
    faults: &[Fault],
    patterns: &[TestVector],
) -> FxHashMap<FaultId, Vec<FaultId>> {
    let sim = FaultSimulator::new(netlist);
    let detect_sets: Vec<DetectSet> = faults
        .iter()
        .map(|f| DetectSet::from_flags(&sim.ppsfp(patterns, f)))
        .collect();

    let mut out: FxHashMap<FaultId, Vec<FaultId>> = FxHashMap::default();
    for (i, fi) in faults.iter().enumerate() {
        if detect_sets[i].is_empty() {
            continue;
        }
        let mut candidates = Vec::new();
        for (j, fj) in faults.iter().enumerate() {
            if i == j {
                continue;
            }
            if detect_sets[j].is_empty() {
                continue;
            }
            if detect_sets[j].superset_of(&detect_sets[i]) {
                candidates.push(fj.id);
            }
        }
        out.insert(fi.id, candidates);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::network::Network;
    use crate::testvector::Bit;

    fn and_netlist() -> Netlist {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        Netlist::build(net)
    }

    fn pattern(bits: &[u8]) -> TestVector {
        let mut v = TestVector::new(bits.len());
        for (i, b) in bits.iter().enumerate() {
            v.set(i, if *b == 1 { Bit::One } else { Bit::Zero });
        }
        v
    }

    #[test]
    fn test_sa1_output_dominates_sa1_input() {
        let nl = and_netlist();
        // On a fanout-free AND, SA1 at input 0 and SA1 at the output are
        // detected by exactly the same patterns (00, 01 both excite both),
        // so each is a dominance candidate of the other.
        let f_out = Fault {
            id: 0,
            node: 0,
            site: crate::fault::FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        let f_in = Fault {
            id: 1,
            node: 0,
            site: crate::fault::FaultSite::Input(0),
            kind: FaultKind::StuckAt1,
        };
        let patterns = vec![pattern(&[1, 1]), pattern(&[0, 1]), pattern(&[1, 0]), pattern(&[0, 0])];
        let cands = dom_candidates(&nl, &[f_out, f_in], &patterns);
        assert!(cands.get(&1).unwrap().contains(&0));
    }
}
