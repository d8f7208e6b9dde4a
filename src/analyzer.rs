//! Per-FFR fault analysis: whether a fault's effect can leave its own FFR at
//! all, and the condition on the FFR root under which it does. Dominance
//! checking (`reduce::dom_check`) uses this to avoid redoing FFR-local SAT
//! work for every candidate pair that shares an FFR.

use crate::assign::{Assign, AssignList};
use crate::encoders::FfrEnc;
use crate::engine::{StructEngine, TimeFrame};
use crate::fault::Fault;
use crate::network::{FfrId, Netlist};
use crate::sat::SatResult;

/// Result of analyzing one fault against its own FFR.
pub struct FaultAnalysis {
    /// Whether the fault's effect can reach the FFR's root at all.
    pub root_testable: bool,
    /// The good-circuit value the FFR root took in the model that proved
    /// `root_testable`, expressed as an `AssignList` over the root node so it
    /// composes with the excitation conditions the rest of the crate already
    /// works with. A sufficient condition witnessed by one solution, not a
    /// condition implied by every solution.
    pub root_mandatory_condition: AssignList,
}

/// Analyzes faults one FFR at a time, reusing one [`StructEngine`] across
/// every fault that shares the FFR.
pub struct FaultAnalyzer<'a> {
    netlist: &'a Netlist,
    ffr: FfrId,
    engine: StructEngine<'a>,
}

impl<'a> FaultAnalyzer<'a> {
    pub fn new(netlist: &'a Netlist, ffr: FfrId) -> FaultAnalyzer<'a> {
        FaultAnalyzer {
            netlist,
            ffr,
            engine: StructEngine::new(netlist, 2),
        }
    }

    /// Run the analysis for `fault`, which must belong to this analyzer's
    /// FFR (`netlist.ffr_of(fault.node) == self.ffr`).
    pub fn run(&mut self, fault: &Fault) -> FaultAnalysis {
        debug_assert_eq!(self.netlist.ffr_of(fault.node), self.ffr);
        let time: TimeFrame = if fault.needs_two_frames() { 1 } else { 0 };

        let excitation = fault.excitation_condition(self.netlist);
        let mut assumptions = self.engine.conv_to_literal_list(&excitation);

        let enc = FfrEnc::new(&mut self.engine, self.ffr, fault, time);
        assumptions.push(enc.prop_var());

        let root = self.netlist.ffr(self.ffr).root;
        let root_testable = self.engine.solve(&assumptions) == SatResult::True;

        let root_mandatory_condition = if root_testable {
            let root_lit = self.engine.var(root, time);
            match self.engine.val(root_lit) {
                Some(v) => AssignList::single(Assign::new(root, time, v as u8)),
                None => AssignList::new(),
            }
        } else {
            AssignList::new()
        };

        FaultAnalysis {
            root_testable,
            root_mandatory_condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultKind, FaultSite};
    use crate::network::Network;

    #[test]
    fn test_analyzer_and_sa0_reaches_root() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        let nl = Netlist::build(net);
        let ffr = nl.ffr_of(0);
        let mut analyzer = FaultAnalyzer::new(&nl, ffr);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        let result = analyzer.run(&fault);
        assert!(result.root_testable);
        assert_eq!(result.root_mandatory_condition.len(), 1);
    }
}
