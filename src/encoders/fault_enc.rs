//! Full-design fault encoding: the excitation condition asserted as
//! assumptions plus design-wide [`BoolDiffEnc`] propagation, the combination
//! a single DTPG query for one fault solves against.

use super::bool_diff::BoolDiffEnc;
use crate::engine::{StructEngine, TimeFrame};
use crate::fault::Fault;
use crate::sat::SatResult;

/// A ready-to-solve DTPG query for one fault: excitation assumptions plus a
/// `prop_var` that must hold for the fault to be detected.
pub struct FaultEnc {
    bool_diff: BoolDiffEnc,
    assumptions: Vec<rustsat::types::Lit>,
}

impl FaultEnc {
    pub fn new(engine: &mut StructEngine, fault: &Fault) -> FaultEnc {
        let time: TimeFrame = if fault.needs_two_frames() { 1 } else { 0 };
        let bool_diff = BoolDiffEnc::new(engine, fault, time);

        let mut assumptions = Vec::new();
        for assign in fault.excitation_condition(engine.netlist()).iter() {
            // The excitation condition pins the *good*-circuit value at the
            // fault site to the complement of the stuck value; for a
            // transition fault this spans both frames.
            let sig = crate::network::Signal::from_var(assign.node);
            let lit = engine.conv_to_literal(sig, assign.time);
            assumptions.push(if assign.value == 1 { lit } else { !lit });
        }
        assumptions.push(bool_diff.prop_var());

        FaultEnc { bool_diff, assumptions }
    }

    /// Run the query: `True` means a test was found, `False` means the fault
    /// is untestable under this engine's scope, `Aborted` means the solver
    /// gave up.
    pub fn solve(&self, engine: &mut StructEngine) -> SatResult {
        engine.solve(&self.assumptions)
    }

    pub fn bool_diff(&self) -> &BoolDiffEnc {
        &self.bool_diff
    }

    pub fn assumptions(&self) -> &[rustsat::types::Lit] {
        &self.assumptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultKind, FaultSite};
    use crate::network::{Netlist, Network};

    #[test]
    fn test_fault_enc_and_sa1_is_untestable_pattern() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        let nl = Netlist::build(net);
        let mut eng = StructEngine::new(&nl, 1);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        let fe = FaultEnc::new(&mut eng, &fault);
        // SA1 on an AND gate's output is excited by driving it to 0 and is
        // always testable on a fanout-free AND.
        let res = fe.solve(&mut eng);
        assert_eq!(res, SatResult::True);
    }
}
