use super::{pi_assignment_to_vector, DtpgConfig, DtpgOutcome, GroupMode};
use crate::encoders::{FfrEnc, MffcEnc};
use crate::engine::StructEngine;
use crate::fault::Fault;
use crate::justify::{Justifier, Strategy};
use crate::network::Netlist;
use crate::sat::SatResult;
use crate::sim::FaultSimulator;
use crate::testvector::{Bit, TestVector};

/// A strategy for turning a fault into a DTPG outcome.
pub trait DtpgDriver {
    fn run(&mut self, fault: &Fault) -> DtpgOutcome;
}

/// Drives every fault against one shared [`StructEngine`], so gates common to
/// several faults' cones (the bulk of the design, away from the fault site)
/// are only Tseitin-encoded once.
pub struct EngineDriver<'a> {
    netlist: &'a Netlist,
    engine: StructEngine<'a>,
    config: DtpgConfig,
}

impl<'a> EngineDriver<'a> {
    /// `nb_frames` should be 2 whenever any fault passed to this driver is a
    /// transition-delay fault; a purely stuck-at fault list only needs 1.
    pub fn new(netlist: &'a Netlist, config: DtpgConfig) -> EngineDriver<'a> {
        EngineDriver {
            netlist,
            engine: StructEngine::new(netlist, config.nb_frames),
            config,
        }
    }
}

impl<'a> DtpgDriver for EngineDriver<'a> {
    fn run(&mut self, fault: &Fault) -> DtpgOutcome {
        // Unlike EncDriver, the engine here is shared across every fault, so
        // the local pre-check's clauses stay in place and are simply reused
        // (or ignored) by whatever query comes next; no reset is needed.
        if self.config.group_mode != GroupMode::None {
            let time: crate::engine::TimeFrame = if fault.needs_two_frames() { 1 } else { 0 };
            let locally_sat = match self.config.group_mode {
                GroupMode::Ffr => {
                    let ffr = self.engine.netlist().ffr_of(fault.node);
                    let enc = FfrEnc::new(&mut self.engine, ffr, fault, time);
                    self.engine.solve(&[enc.prop_var()]) == SatResult::True
                }
                GroupMode::Mffc => {
                    let mffc = self.engine.netlist().mffc_of(fault.node);
                    let enc = MffcEnc::new(&mut self.engine, mffc, fault, time);
                    self.engine.solve(&[enc.prop_var()]) == SatResult::True
                }
                GroupMode::None => unreachable!(),
            };
            if !locally_sat {
                return DtpgOutcome::Untestable;
            }
        }
        run_against(self.netlist, &mut self.engine, fault, self.config)
    }
}

/// Drives each fault against a small, purpose-built engine: a fresh
/// [`StructEngine`] per query, scoped down via [`FfrEnc`]/[`MffcEnc`] when
/// [`GroupMode`] asks for it. Costs more total CNF construction than
/// [`EngineDriver`] but keeps any one query's variable count small, which
/// matters when faults are scattered across unrelated regions of a large
/// design and a shared engine would accumulate clauses no single query uses.
pub struct EncDriver<'a> {
    netlist: &'a Netlist,
    config: DtpgConfig,
}

impl<'a> EncDriver<'a> {
    pub fn new(netlist: &'a Netlist, config: DtpgConfig) -> EncDriver<'a> {
        EncDriver { netlist, config }
    }
}

impl<'a> DtpgDriver for EncDriver<'a> {
    fn run(&mut self, fault: &Fault) -> DtpgOutcome {
        let nb_frames = if fault.needs_two_frames() { 2 } else { 1 };
        let mut engine = StructEngine::new(self.netlist, nb_frames);

        // A local propagation check first: if the fault's effect cannot even
        // reach its own FFR/MFFC root, it certainly cannot reach a primary
        // output, so a local UNSAT lets us skip building the full cone.
        if self.config.group_mode != GroupMode::None {
            let time: crate::engine::TimeFrame = if fault.needs_two_frames() { 1 } else { 0 };
            let locally_sat = match self.config.group_mode {
                GroupMode::Ffr => {
                    let ffr = engine.netlist().ffr_of(fault.node);
                    let enc = FfrEnc::new(&mut engine, ffr, fault, time);
                    engine.solve(&[enc.prop_var()]) == SatResult::True
                }
                GroupMode::Mffc => {
                    let mffc = engine.netlist().mffc_of(fault.node);
                    let enc = MffcEnc::new(&mut engine, mffc, fault, time);
                    engine.solve(&[enc.prop_var()]) == SatResult::True
                }
                GroupMode::None => unreachable!(),
            };
            if !locally_sat {
                return DtpgOutcome::Untestable;
            }
            // Re-create a clean engine for the full-design query: the local
            // probe above added scoped clauses that do not cover the rest of
            // the cone to a primary output.
            engine = StructEngine::new(self.netlist, nb_frames);
        }

        run_against(self.netlist, &mut engine, fault, self.config)
    }
}

fn run_against(netlist: &Netlist, engine: &mut StructEngine, fault: &Fault, config: DtpgConfig) -> DtpgOutcome {
    let fault_enc = crate::encoders::FaultEnc::new(engine, fault);
    match fault_enc.solve(engine) {
        SatResult::True => {
            let assigns = engine.get_pi_assign(0);
            let nb_inputs = netlist.network().nb_inputs() as usize;
            let full_tv = pi_assignment_to_vector(nb_inputs, &assigns);
            let tv = justify_pattern(netlist, fault, config, nb_inputs).unwrap_or(full_tv);
            DtpgOutcome::Detected(tv)
        }
        SatResult::False => DtpgOutcome::Untestable,
        SatResult::Aborted => DtpgOutcome::Aborted,
    }
}

/// Tries to shrink the solver's full primary-input readout to the smaller
/// cube the structural [`Justifier`] derives from the fault's excitation
/// condition alone. The justifier reasons purely from gate logic and knows
/// nothing about *propagation*, so the candidate is only accepted once the
/// fault simulator independently confirms it still detects `fault`; any
/// mismatch (or `Naive`, which skips justification entirely) falls back to
/// the full readout.
fn justify_pattern(netlist: &Netlist, fault: &Fault, config: DtpgConfig, nb_inputs: usize) -> Option<TestVector> {
    if config.justify == Strategy::Naive {
        return None;
    }
    let justifier = Justifier::new(netlist, config.justify);
    let pi_cube = justifier.justify(&fault.excitation_condition(netlist))?;

    let mut tv = TestVector::new(nb_inputs);
    for a in pi_cube.iter() {
        tv.set(a.node as usize, if a.value == 1 { Bit::One } else { Bit::Zero });
    }

    let sim = FaultSimulator::new(netlist);
    if sim.spsfp(&tv, fault) {
        Some(tv)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultKind, FaultSite};
    use crate::network::Network;

    fn small_and() -> Netlist {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        Netlist::build(net)
    }

    #[test]
    fn test_engine_driver_detects_sa1() {
        let nl = small_and();
        let config = DtpgConfig {
            group_mode: GroupMode::None,
            ..DtpgConfig::default()
        };
        let mut driver = EngineDriver::new(&nl, config);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        match driver.run(&fault) {
            DtpgOutcome::Detected(tv) => {
                assert!(FaultSimulator::new(&nl).spsfp(&tv, &fault));
            }
            other => panic!("expected Detected, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_driver_justified_pattern_still_detects() {
        let nl = small_and();
        let config = DtpgConfig {
            group_mode: GroupMode::None,
            justify: Strategy::Just2,
            ..DtpgConfig::default()
        };
        let mut driver = EngineDriver::new(&nl, config);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        match driver.run(&fault) {
            DtpgOutcome::Detected(tv) => {
                assert!(FaultSimulator::new(&nl).spsfp(&tv, &fault));
            }
            other => panic!("expected Detected, got {:?}", other),
        }
    }

    #[test]
    fn test_enc_driver_ffr_scope_matches_engine_driver() {
        let nl = small_and();
        let config = DtpgConfig {
            group_mode: GroupMode::Ffr,
            driver_type: crate::dtpg::DriverType::Enc,
            ..DtpgConfig::default()
        };
        let mut driver = EncDriver::new(&nl, config);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        match driver.run(&fault) {
            DtpgOutcome::Detected(_) => {}
            other => panic!("expected Detected, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_driver_honors_ffr_group_mode() {
        let nl = small_and();
        let config = DtpgConfig {
            group_mode: GroupMode::Ffr,
            driver_type: crate::dtpg::DriverType::Engine,
            ..DtpgConfig::default()
        };
        let mut driver = EngineDriver::new(&nl, config);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        match driver.run(&fault) {
            DtpgOutcome::Detected(tv) => {
                assert!(FaultSimulator::new(&nl).spsfp(&tv, &fault));
            }
            other => panic!("expected Detected, got {:?}", other),
        }
    }
}
