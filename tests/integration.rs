//! End-to-end tests exercising the public library surface: read a `.bench`
//! netlist, generate test patterns for its faults with DTPG, and reduce the
//! resulting fault list by dominance.

use scanforge::dtpg::{dtpg_run, DtpgConfig, DtpgOutcome};
use scanforge::fault::{collapsed_stuck_at_faults, collapsed_transition_faults, FaultKind};
use scanforge::faultinfo::{FaultInfoMgr, FaultStatus};
use scanforge::io::read_bench;
use scanforge::network::Netlist;
use scanforge::reduce::reduce;

const C17_LIKE: &str = "
INPUT(i0)
INPUT(i1)
INPUT(i2)
INPUT(i3)
INPUT(i4)

OUTPUT(x5)
OUTPUT(x6)

x0 = AND(i0, i1)
x1 = AND(i1, i2)
x2 = AND(i2, i3)
x3 = AND(x0, x2)
x4 = AND(x1, i4)
x5 = AND(x3, x1)
x6 = AND(x1, x4)
";

fn run_all_stuck_at(src: &str) -> (Netlist, FaultInfoMgr, Vec<scanforge::fault::Fault>) {
    let net = read_bench(src.as_bytes()).unwrap();
    let nl = Netlist::build(net);
    let faults = collapsed_stuck_at_faults(&nl);
    let mgr = FaultInfoMgr::new(&faults);
    let config = DtpgConfig::default();
    let (outcomes, _stats) = dtpg_run(&nl, &faults, config);
    for (fault, outcome) in faults.iter().zip(outcomes) {
        match outcome {
            DtpgOutcome::Detected(tv) => mgr.mark_detected(fault.id, tv),
            DtpgOutcome::Untestable => mgr.mark_untestable(fault.id),
            DtpgOutcome::Aborted => mgr.mark_aborted(fault.id),
        }
    }
    (nl, mgr, faults)
}

#[test]
fn full_coverage_on_a_small_combinational_circuit() {
    let (_nl, mgr, faults) = run_all_stuck_at(C17_LIKE);
    let summary = mgr.summary();
    assert_eq!(summary.total, faults.len());
    assert_eq!(summary.aborted, 0);
    assert_eq!(summary.detected + summary.untestable, summary.total);
    // This small AND-only cone has no structurally redundant faults.
    assert_eq!(summary.untestable, 0);
    assert_eq!(summary.coverage(), 1.0);
}

#[test]
fn detected_patterns_actually_excite_their_fault() {
    let (nl, mgr, faults) = run_all_stuck_at(C17_LIKE);
    let sim = scanforge::sim::FaultSimulator::new(&nl);
    for fault in &faults {
        if mgr.status(fault.id) == FaultStatus::Detected {
            let tv = mgr.snapshot()[fault.id as usize].detecting_pattern.clone().unwrap();
            assert!(sim.spsfp(&tv, fault), "pattern for {fault} failed to detect it in simulation");
        }
    }
}

#[test]
fn reduction_never_increases_detected_count_and_keeps_coverage() {
    let (nl, mgr, faults) = run_all_stuck_at(C17_LIKE);
    let before = mgr.summary();

    let stats = reduce(&nl, &faults, &mgr);
    let after = mgr.summary();

    assert_eq!(stats.nb_deleted as usize, after.deleted);
    // Detection is never invented by reduction; a fault only moves from
    // "detected" to "deleted", never the other way.
    assert_eq!(after.detected + after.deleted, before.detected);
    assert_eq!(after.untestable, before.untestable);
}

#[test]
fn stuck_at_fault_count_matches_collapsing_rule() {
    let net = read_bench(C17_LIKE.as_bytes()).unwrap();
    let nl = Netlist::build(net);
    let faults = collapsed_stuck_at_faults(&nl);
    // Two faults (SA0/SA1) per node output, plus two per collapsed fanin on
    // multi-fanout drivers only.
    let nb_nodes = nl.network().nb_nodes();
    assert!(faults.len() >= nb_nodes * 2);
    assert!(faults.iter().all(|f| matches!(f.kind, FaultKind::StuckAt0 | FaultKind::StuckAt1)));
}

#[test]
fn transition_delay_faults_need_two_frames_and_are_detectable() {
    let net = read_bench(C17_LIKE.as_bytes()).unwrap();
    let nl = Netlist::build(net);
    let faults = collapsed_transition_faults(&nl);
    assert!(!faults.is_empty());
    assert!(faults.iter().all(|f| f.needs_two_frames()));

    let mgr = FaultInfoMgr::new(&faults);
    let config = DtpgConfig::default();
    let (outcomes, _stats) = dtpg_run(&nl, &faults, config);
    for (fault, outcome) in faults.iter().zip(outcomes) {
        match outcome {
            DtpgOutcome::Detected(tv) => mgr.mark_detected(fault.id, tv),
            DtpgOutcome::Untestable => mgr.mark_untestable(fault.id),
            DtpgOutcome::Aborted => mgr.mark_aborted(fault.id),
        }
    }
    let summary = mgr.summary();
    assert_eq!(summary.aborted, 0);
    assert!(summary.detected > 0);
}

#[test]
fn dff_bearing_netlist_round_trips_and_simulates() {
    let src = "
INPUT(i0)
INPUT(i1)
OUTPUT(x2)

x0 = AND(i0, i1)
x1 = DFF(x0)
x2 = BUF(x1)
";
    let net = read_bench(src.as_bytes()).unwrap();
    assert!(!net.is_comb());
    let nl = Netlist::build(net);

    let mut buf = Vec::new();
    scanforge::io::write_bench(&mut buf, nl.network()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let reread = read_bench(text.as_bytes()).unwrap();
    assert_eq!(reread.nb_inputs(), nl.network().nb_inputs());
    assert_eq!(reread.nb_outputs(), nl.network().nb_outputs());

    let faults = collapsed_stuck_at_faults(&nl);
    assert!(!faults.is_empty());
}
