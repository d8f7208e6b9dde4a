//! Command line interface

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use scanforge::dtpg::{dtpg_run, DtpgConfig, DtpgOutcome};
use scanforge::fault::{collapsed_transition_faults, representative_stuck_at_faults, Fault};
use scanforge::faultinfo::{FaultInfoMgr, FaultStatus};
use scanforge::io::{read_bench, read_patterns, write_patterns};
use scanforge::network::{stats::stats, Netlist, Network};
use scanforge::reduce::reduce;
use scanforge::sim::{simulate, FaultSimulator};
use scanforge::testvector::TestVector;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a logic network
    ///
    /// Prints the gate-type breakdown and the FFR/MFFC decomposition size
    /// used to scope ATPG queries.
    #[clap()]
    Show(ShowArgs),

    /// Simulate a logic network
    ///
    /// Uses the same one-bit-per-input pattern format ATPG writes, one
    /// pattern per line, `X` meaning unspecified.
    #[clap(alias = "sim")]
    Simulate(SimulateArgs),

    /// Generate test patterns for every stuck-at (and optionally
    /// transition-delay) fault in a design
    ///
    /// Full-scan assumption: every flip-flop input/output is directly
    /// controllable/observable, so only a single (or, for transition faults,
    /// launch/capture pair of) combinational pattern is generated per fault.
    /// Fault coverage is achieved with a SAT solver, falling back to
    /// structural justification where it suffices on its own.
    #[clap()]
    Atpg(AtpgArgs),

    /// Generate test patterns, then drop every fault proven redundant by
    /// dominance
    ///
    /// Same pipeline as `atpg`, with an extra pass that finds, for each
    /// detected fault, whether some other fault's test set already covers it,
    /// and removes it from the reported fault list if so.
    #[clap()]
    Reduce(ReduceArgs),
}

fn read_network_file(path: &Path) -> Network {
    let f = std::fs::File::open(path).unwrap_or_else(|e| panic!("failed to open {}: {}", path.display(), e));
    read_bench(f).unwrap_or_else(|e| panic!("failed to parse {}: {}", path.display(), e))
}

fn read_pattern_file(path: &Path) -> Vec<TestVector> {
    let f = std::fs::File::open(path).unwrap_or_else(|e| panic!("failed to open {}: {}", path.display(), e));
    read_patterns(f).unwrap_or_else(|e| panic!("failed to parse {}: {}", path.display(), e))
}

fn write_pattern_file(path: &Path, patterns: &[TestVector]) {
    let mut f = std::fs::File::create(path).unwrap_or_else(|e| panic!("failed to create {}: {}", path.display(), e));
    write_patterns(&mut f, patterns).unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
}

/// Command arguments for network information
#[derive(Args)]
pub struct ShowArgs {
    /// Network to show
    file: PathBuf,
}

impl ShowArgs {
    pub fn run(&self) {
        let net = read_network_file(&self.file);
        println!("Network stats:\n{}\n", stats(&net));
        let nl = Netlist::build(net);
        println!("FFRs:  {}", nl.ffrs().len());
        println!("MFFCs: {}", nl.mffcs().len());
    }
}

/// Command arguments for simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Network to simulate
    network: PathBuf,

    /// Input patterns file, one cycle per line
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output file for output patterns
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Report weighted switching activity over the pattern sequence instead
    /// of (in addition to) writing outputs
    #[arg(long)]
    wsa: bool,
}

impl SimulateArgs {
    pub fn run(&self) {
        let net = read_network_file(&self.network);
        let nl = Netlist::build(net);
        let cycles = read_pattern_file(&self.input);
        let outputs = simulate(&nl, &cycles);
        write_pattern_file(&self.output, &outputs);
        if self.wsa {
            let sim = FaultSimulator::new(&nl);
            println!("Weighted switching activity: {}", sim.calc_wsa(&cycles));
        }
    }
}

fn faults_for(nl: &Netlist, transition_delay: bool) -> Vec<Fault> {
    let mut faults = representative_stuck_at_faults(nl);
    if transition_delay {
        let mut next_id = faults.len() as u32;
        for mut f in collapsed_transition_faults(nl) {
            f.id = next_id;
            next_id += 1;
            faults.push(f);
        }
    }
    faults
}

fn run_dtpg(nl: &Netlist, faults: &[Fault], seed: u64) -> (FaultInfoMgr, Vec<TestVector>) {
    let mgr = FaultInfoMgr::new(faults);
    let config = DtpgConfig {
        random_fill_seed: seed,
        ..Default::default()
    };
    let (outcomes, _stats) = dtpg_run(nl, faults, config);
    let mut patterns = Vec::new();
    for (fault, outcome) in faults.iter().zip(outcomes) {
        match outcome {
            DtpgOutcome::Detected(tv) => {
                mgr.mark_detected(fault.id, tv.clone());
                patterns.push(tv);
            }
            DtpgOutcome::Untestable => mgr.mark_untestable(fault.id),
            DtpgOutcome::Aborted => mgr.mark_aborted(fault.id),
        }
    }
    (mgr, patterns)
}

fn print_summary(mgr: &FaultInfoMgr) {
    let s = mgr.summary();
    println!(
        "Faults: {} total, {} detected, {} untestable, {} aborted, {} deleted",
        s.total, s.detected, s.untestable, s.aborted, s.deleted
    );
    println!("Coverage: {:.2}%", s.coverage() * 100.0);
}

/// Command arguments for test pattern generation
#[derive(Args)]
pub struct AtpgArgs {
    /// Network to generate test patterns for
    network: PathBuf,

    /// Output file for test patterns
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Random seed used to fill don't-care bits
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Also generate slow-to-rise/slow-to-fall transition-delay faults
    #[arg(long)]
    transition_delay: bool,
}

impl AtpgArgs {
    pub fn run(&self) {
        let net = read_network_file(&self.network);
        let nl = Netlist::build(net);
        let faults = faults_for(&nl, self.transition_delay);
        let (mgr, patterns) = run_dtpg(&nl, &faults, self.seed);
        write_pattern_file(&self.output, &patterns);
        print_summary(&mgr);
    }
}

/// Command arguments for test pattern generation with fault-list reduction
#[derive(Args)]
pub struct ReduceArgs {
    /// Network to generate test patterns for
    network: PathBuf,

    /// Output file for test patterns
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Random seed used to fill don't-care bits
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Also generate slow-to-rise/slow-to-fall transition-delay faults
    #[arg(long)]
    transition_delay: bool,
}

impl ReduceArgs {
    pub fn run(&self) {
        let net = read_network_file(&self.network);
        let nl = Netlist::build(net);
        let faults = faults_for(&nl, self.transition_delay);
        let (mgr, _patterns) = run_dtpg(&nl, &faults, self.seed);
        println!("Before reduction:");
        print_summary(&mgr);

        let stats = reduce(&nl, &faults, &mgr);
        println!(
            "Reduction: {} candidates, {} checks, {} faults dropped",
            stats.nb_candidates, stats.nb_checks, stats.nb_deleted
        );
        println!("After reduction:");
        print_summary(&mgr);

        // The patterns still needed once dominated faults are dropped: one
        // per surviving detected fault, deduplicated by pattern content.
        let mut seen = std::collections::HashSet::new();
        let mut reduced_patterns = Vec::new();
        for fi in mgr.snapshot() {
            if fi.status == FaultStatus::Deleted {
                continue;
            }
            if let Some(tv) = fi.detecting_pattern {
                if seen.insert(tv.hex_str()) {
                    reduced_patterns.push(tv);
                }
            }
        }
        write_pattern_file(&self.output, &reduced_patterns);
    }
}
