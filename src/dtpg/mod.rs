//! Test-pattern generation: given a fault, find a primary-input pattern that
//! excites and propagates it, or prove none exists within the engine's scope.

mod driver;

pub use driver::{DtpgDriver, EncDriver, EngineDriver};

use crate::fault::Fault;
use crate::justify::Strategy as JustifyStrategy;
use crate::network::Netlist;
use crate::testvector::{Bit, TestVector};

/// How much of the design a single query's Boolean-difference propagation
/// spans before falling back to (or starting from) the full design.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroupMode {
    /// Propagate across the whole design in one query.
    None,
    /// Try FFR-local propagation first; escalate to a full-design query only
    /// if the cheap local query is satisfiable.
    Ffr,
    /// As `Ffr`, but the local query spans the fault's whole MFFC.
    Mffc,
}

/// Which driver implementation runs the query.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DriverType {
    /// One [`crate::engine::StructEngine`] shared across every fault, so
    /// CNF for gates common to several faults' cones is built once.
    Engine,
    /// A fresh, narrowly-scoped engine per fault (or per [`GroupMode`]
    /// group), trading shared-clause reuse for a smaller per-query engine.
    Enc,
}

/// Bound on solver effort; `None` means no limit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SatParam {
    pub conflict_limit: Option<u32>,
}

#[derive(Clone, Copy, Debug)]
pub struct DtpgConfig {
    pub group_mode: GroupMode,
    pub driver_type: DriverType,
    pub justify: JustifyStrategy,
    pub sat_param: SatParam,
    pub nb_frames: u8,
    pub random_fill_seed: u64,
}

impl Default for DtpgConfig {
    fn default() -> DtpgConfig {
        DtpgConfig {
            group_mode: GroupMode::Ffr,
            driver_type: DriverType::Engine,
            justify: JustifyStrategy::Just1,
            sat_param: SatParam::default(),
            nb_frames: 1,
            random_fill_seed: 0,
        }
    }
}

/// Outcome of a single DTPG query.
#[derive(Clone, Debug)]
pub enum DtpgOutcome {
    Detected(TestVector),
    Untestable,
    Aborted,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DtpgStats {
    pub nb_detected: u32,
    pub nb_untestable: u32,
    pub nb_aborted: u32,
    pub nb_sat_calls: u32,
}

impl DtpgStats {
    fn record(&mut self, outcome: &DtpgOutcome) {
        self.nb_sat_calls += 1;
        match outcome {
            DtpgOutcome::Detected(_) => self.nb_detected += 1,
            DtpgOutcome::Untestable => self.nb_untestable += 1,
            DtpgOutcome::Aborted => self.nb_aborted += 1,
        }
    }
}

/// Run DTPG for every fault in `faults`, returning one outcome per fault in
/// the same order and the aggregate statistics. Random-fills the `X` bits of
/// every detected pattern before returning it.
pub fn dtpg_run(netlist: &Netlist, faults: &[Fault], mut config: DtpgConfig) -> (Vec<DtpgOutcome>, DtpgStats) {
    let mut stats = DtpgStats::default();
    let mut outcomes = Vec::with_capacity(faults.len());

    if faults.iter().any(|f| f.needs_two_frames()) {
        config.nb_frames = 2;
    }

    let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(config.random_fill_seed);

    match config.driver_type {
        DriverType::Engine => {
            let mut driver = EngineDriver::new(netlist, config);
            for fault in faults {
                let mut outcome = driver.run(fault);
                if let DtpgOutcome::Detected(ref mut tv) = outcome {
                    tv.fix_x_from_random(&mut rng);
                }
                stats.record(&outcome);
                outcomes.push(outcome);
            }
        }
        DriverType::Enc => {
            let mut driver = EncDriver::new(netlist, config);
            for fault in faults {
                let mut outcome = driver.run(fault);
                if let DtpgOutcome::Detected(ref mut tv) = outcome {
                    tv.fix_x_from_random(&mut rng);
                }
                stats.record(&outcome);
                outcomes.push(outcome);
            }
        }
    }

    (outcomes, stats)
}

/// Build a [`TestVector`] from the primary-input literals a solved engine
/// assigned in the launch frame (frame 0), leaving any input the query never
/// touched as `X`.
pub(crate) fn pi_assignment_to_vector(nb_inputs: usize, assigns: &[(u32, bool)]) -> TestVector {
    let mut tv = TestVector::new(nb_inputs);
    for &(input, value) in assigns {
        tv.set(input as usize, if value { Bit::One } else { Bit::Zero });
    }
    tv
}
