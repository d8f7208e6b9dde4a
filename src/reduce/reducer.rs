//! Orchestrates fault-list reduction: generate dominance candidates by
//! simulation, then confirm them with SAT, deleting every fault some other
//! fault is shown to dominate. Faults sharing an FFR are checked with the
//! cheaper [`FfrDomChecker`]; everything else falls back to [`DomChecker`].

use super::dom_cand::dom_candidates;
use super::dom_check::{trivial_check, DomChecker, FfrDomChecker};
use crate::analyzer::FaultAnalyzer;
use crate::fault::{Fault, FaultId};
use crate::faultinfo::{FaultInfoMgr, FaultStatus};
use crate::network::Netlist;
use fxhash::FxHashMap;
use itertools::Itertools;

#[derive(Clone, Copy, Debug, Default)]
pub struct ReduceStats {
    pub nb_candidates: u32,
    pub nb_checks: u32,
    pub nb_deleted: u32,
}

/// Reduces the fault list tracked by `mgr`, deleting every fault dominated by
/// another still-active fault. Returns the set of faults still active after
/// reduction, along with counters for reporting.
pub fn reduce(netlist: &Netlist, faults: &[Fault], mgr: &FaultInfoMgr) -> ReduceStats {
    let mut stats = ReduceStats::default();

    // PPSFP cost scales with the pattern count, and several faults commonly
    // share the exact same detecting pattern, so dedup before simulating.
    let patterns: Vec<_> = mgr
        .snapshot()
        .into_iter()
        .filter(|f| f.status == FaultStatus::Detected)
        .filter_map(|f| f.detecting_pattern)
        .unique_by(|tv| tv.hex_str())
        .collect();
    if patterns.is_empty() {
        return stats;
    }

    let faults_by_id: FxHashMap<FaultId, &Fault> = faults.iter().map(|f| (f.id, f)).collect();
    let candidates = dom_candidates(netlist, faults, &patterns);
    stats.nb_candidates = candidates.values().map(|v| v.len() as u32).sum();

    let mut ffr_checkers: FxHashMap<u32, FfrDomChecker> = FxHashMap::default();
    let mut global_checker = DomChecker::new(netlist, 2);
    let mut analyzers: FxHashMap<u32, FaultAnalyzer> = FxHashMap::default();

    for (fault2_id, dominators) in candidates.iter() {
        if mgr.status(*fault2_id) == FaultStatus::Deleted {
            continue;
        }
        let Some(&fault2) = faults_by_id.get(fault2_id) else {
            continue;
        };
        for &fault1_id in dominators {
            if mgr.status(fault1_id) == FaultStatus::Deleted {
                continue;
            }
            let Some(&fault1) = faults_by_id.get(&fault1_id) else {
                continue;
            };

            // A fault whose own effect never reaches its FFR root can never
            // reach a primary output either, so it cannot dominate anything;
            // skip the heavier checkers below for it.
            let ffr1 = netlist.ffr_of(fault1.node);
            let analyzer = analyzers.entry(ffr1).or_insert_with(|| FaultAnalyzer::new(netlist, ffr1));
            if !analyzer.run(fault1).root_testable {
                continue;
            }

            if let Some(trivial) = trivial_check(netlist, fault1, fault2, mgr.status(*fault2_id) == FaultStatus::Untestable) {
                stats.nb_checks += 1;
                if trivial {
                    mgr.mark_deleted(*fault2_id);
                    stats.nb_deleted += 1;
                    break;
                } else {
                    continue;
                }
            }

            stats.nb_checks += 1;
            let dominated = if netlist.ffr_of(fault1.node) == netlist.ffr_of(fault2.node) {
                let checker = ffr_checkers
                    .entry(netlist.ffr_of(fault1.node))
                    .or_insert_with(|| FfrDomChecker::new(netlist, netlist.ffr_of(fault1.node)));
                checker.check(fault1, fault2)
            } else {
                global_checker.check(fault1, fault2)
            };

            if dominated {
                mgr.mark_deleted(*fault2_id);
                stats.nb_deleted += 1;
                break;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultKind, FaultSite};
    use crate::network::Network;
    use crate::testvector::{Bit, TestVector};

    #[test]
    fn test_reduce_drops_redundant_input_fault() {
        let mut net = Network::new();
        let inputs = net.add_inputs(3);
        let a = net.and(inputs[0], inputs[1]);
        let b = net.and(a, inputs[2]);
        net.add_output(b);
        let nl = Netlist::build(net);

        let f_out = Fault {
            id: 0,
            node: 1,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        let f_in = Fault {
            id: 1,
            node: 1,
            site: FaultSite::Input(0),
            kind: FaultKind::StuckAt1,
        };
        let faults = vec![f_out, f_in];

        let mgr = FaultInfoMgr::new(&faults);
        let mut pat = TestVector::new(3);
        pat.set(0, Bit::One);
        pat.set(1, Bit::One);
        pat.set(2, Bit::One);
        mgr.mark_detected(0, pat.clone());
        mgr.mark_detected(1, pat);

        let stats = reduce(&nl, &faults, &mgr);
        assert!(stats.nb_deleted >= 1);
        assert_eq!(mgr.status(1), FaultStatus::Deleted);
    }
}
