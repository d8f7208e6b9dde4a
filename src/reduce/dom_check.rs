//! SAT confirmation of fault dominance: `fault1` dominates `fault2` when no
//! test pattern detects `fault1` without also detecting `fault2`, checked by
//! asserting `fault1` propagates while `fault2` does not and looking for
//! UNSAT.

use crate::assign::CompareResult;
use crate::encoders::{FaultEnc, FfrEnc};
use crate::engine::{StructEngine, TimeFrame};
use crate::fault::{Fault, FaultSite};
use crate::network::{FfrId, Netlist};
use crate::sat::SatResult;

/// Structural shortcuts that decide dominance (or its impossibility) without
/// a SAT call. Returns `None` when neither side can be decided this way and
/// a full checker must run.
pub fn trivial_check(netlist: &Netlist, fault1: &Fault, fault2: &Fault, fault2_known_untestable: bool) -> Option<bool> {
    if fault1.node == fault2.node && fault1.site == fault2.site && fault1.kind == fault2.kind {
        return Some(true);
    }
    // A fault that can never be detected is dominated by everything: keeping
    // fault1 in the test set costs nothing extra towards covering fault2.
    if fault2_known_untestable {
        return Some(true);
    }
    // Whenever exciting fault1 pins some node/time pair to the opposite of
    // what exciting fault2 requires, the two excitation conditions can never
    // hold in the same pattern, so a pattern detecting fault1 never even
    // activates fault2 (the same-site opposite-polarity case is one instance
    // of this, but so is any other excitation conflict).
    let excite1 = fault1.excitation_condition(netlist);
    let excite2 = fault2.excitation_condition(netlist);
    if excite1.compare(&excite2) == CompareResult::Conflicting {
        return Some(false);
    }
    None
}

/// Checks dominance between two faults that share an FFR, reusing one
/// [`StructEngine`] across every pair checked against the same FFR.
pub struct FfrDomChecker<'a> {
    netlist: &'a Netlist,
    ffr: FfrId,
    engine: StructEngine<'a>,
}

impl<'a> FfrDomChecker<'a> {
    pub fn new(netlist: &'a Netlist, ffr: FfrId) -> FfrDomChecker<'a> {
        FfrDomChecker {
            netlist,
            ffr,
            engine: StructEngine::new(netlist, 2),
        }
    }

    /// `true` if `fault1` dominates `fault2` (both assumed to lie in this
    /// checker's FFR): no pattern detects `fault1` without also detecting
    /// `fault2`, checked locally within the FFR only.
    pub fn check(&mut self, fault1: &Fault, fault2: &Fault) -> bool {
        let time: TimeFrame = if fault1.needs_two_frames() || fault2.needs_two_frames() {
            1
        } else {
            0
        };
        let excitation = fault1.excitation_condition(self.netlist);
        let mut assumptions = self.engine.conv_to_literal_list(&excitation);

        let enc1 = FfrEnc::new(&mut self.engine, self.ffr, fault1, time);
        let enc2 = FfrEnc::new(&mut self.engine, self.ffr, fault2, time);
        assumptions.push(enc1.prop_var());
        assumptions.push(!enc2.prop_var());

        self.engine.solve(&assumptions) == SatResult::False
    }
}

/// Checks dominance between two faults regardless of which FFR they sit in,
/// falling back to full-design Boolean-difference propagation for each.
/// Correct (if inefficient) even when both faults share an FFR;
/// [`FfrDomChecker`] should be preferred in that case.
pub struct DomChecker<'a> {
    netlist: &'a Netlist,
    engine: StructEngine<'a>,
}

impl<'a> DomChecker<'a> {
    pub fn new(netlist: &'a Netlist, nb_frames: TimeFrame) -> DomChecker<'a> {
        DomChecker {
            netlist,
            engine: StructEngine::new(netlist, nb_frames),
        }
    }

    pub fn check(&mut self, fault1: &Fault, fault2: &Fault) -> bool {
        let fe1 = FaultEnc::new(&mut self.engine, fault1);
        let time2: TimeFrame = if fault2.needs_two_frames() { 1 } else { 0 };
        let fe2 = crate::encoders::BoolDiffEnc::new(&mut self.engine, fault2, time2);

        let mut assumptions = fe1.assumptions().to_vec();
        assumptions.push(!fe2.prop_var());
        self.engine.solve(&assumptions) == SatResult::False
    }
}

/// Always-false quick check used before falling back to full SAT: if
/// `fault2`'s site is not even in `fault1`'s transitive fanout, `fault1`'s
/// effect structurally cannot be the reason `fault2` is detected, but
/// `fault2` may still be detected independently, so this only rules out the
/// (rare) case where `fault1` and `fault2` sit on the same line with
/// incompatible sites.
pub fn same_site_incompatible(fault1: &Fault, fault2: &Fault) -> bool {
    matches!(
        (fault1.site, fault2.site),
        (FaultSite::Input(a), FaultSite::Input(b)) if fault1.node == fault2.node && a != b
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::network::Network;

    fn small_and() -> Netlist {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        Netlist::build(net)
    }

    #[test]
    fn test_trivial_check_identical_fault() {
        let nl = small_and();
        let f = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        assert_eq!(trivial_check(&nl, &f, &f, false), Some(true));
    }

    #[test]
    fn test_trivial_check_opposite_polarity() {
        let nl = small_and();
        let f1 = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        let f2 = Fault {
            id: 1,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        assert_eq!(trivial_check(&nl, &f1, &f2, false), Some(false));
    }

    #[test]
    fn test_ffr_dom_checker_output_dominates_redundant_input_fault() {
        let mut net = Network::new();
        let inputs = net.add_inputs(3);
        let a = net.and(inputs[0], inputs[1]);
        let b = net.and(a, inputs[2]);
        net.add_output(b);
        let nl = Netlist::build(net);
        let ffr = nl.ffr_of(1);
        let mut checker = FfrDomChecker::new(&nl, ffr);
        // SA1 at node 1 (the second And)'s output and SA1 at its first input
        // (node 0, single fanout) detect exactly the same patterns.
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
        assert!(checker.check(&f_out, &f_in));
    }
}
