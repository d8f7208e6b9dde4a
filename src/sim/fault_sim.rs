//! Bit-parallel 3-valued fault simulator: SPSFP (one pattern, one fault),
//! SPPFP (one pattern, up to [`PV_BITLEN`] faults in parallel) and PPSFP (up
//! to [`PV_BITLEN`] patterns, one fault in parallel).

use super::eval::{apply_inversion, eval_comb};
use super::packed::{PackedVal, PV_BITLEN};
use crate::fault::{Fault, FaultSite};
use crate::network::{Gate, Netlist, NodeId, Signal};
use crate::testvector::{Bit, TestVector};
use fxhash::FxHashMap;

/// A single forced value applied to one fault site for the lanes set in
/// `mask`. Lanes outside the mask see the fault-free value.
#[derive(Clone, Copy, Debug)]
struct Injection {
    node: NodeId,
    site: FaultSite,
    mask: u64,
    forced: PackedVal,
}

fn select(good: PackedVal, forced: PackedVal, mask: u64) -> PackedVal {
    PackedVal {
        v0: (good.v0 & !mask) | (forced.v0 & mask),
        v1: (good.v1 & !mask) | (forced.v1 & mask),
    }
}

/// Evaluate every node of `netlist` for one time frame, given the packed
/// values of its primary inputs and the flip-flop `Q` state carried in from
/// the previous frame. Returns the per-node values and the data value each
/// flip-flop latches for the *next* frame.
fn simulate_frame(
    netlist: &Netlist,
    pi_values: &[PackedVal],
    dff_state: &FxHashMap<NodeId, PackedVal>,
    injections: &[Injection],
) -> (Vec<PackedVal>, FxHashMap<NodeId, PackedVal>) {
    let n = netlist.nb_nodes();
    let mut values = vec![PackedVal::all_x(); n];
    let mut by_node: FxHashMap<NodeId, Vec<&Injection>> = FxHashMap::default();
    for inj in injections {
        by_node.entry(inj.node).or_default().push(inj);
    }

    let read_signal = |s: Signal, values: &[PackedVal]| -> PackedVal {
        let v = if s.is_constant() {
            PackedVal::broadcast(false)
        } else if s.is_input() {
            pi_values[s.input() as usize]
        } else {
            values[s.var() as usize]
        };
        apply_inversion(v, s.is_inverted())
    };

    for i in 0..n {
        let gate = netlist.network().gate(i);
        let fanin_signals = gate.dependencies();
        let node_id = i as NodeId;

        if let Gate::Dff(_) = gate {
            let mut v = *dff_state.get(&node_id).unwrap_or(&PackedVal::all_x());
            if let Some(injs) = by_node.get(&node_id) {
                for inj in injs {
                    if inj.site == FaultSite::Output {
                        v = select(v, inj.forced, inj.mask);
                    }
                }
            }
            values[i] = v;
            continue;
        }

        let mut fanins: Vec<PackedVal> = fanin_signals
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let mut v = read_signal(*s, &values);
                if let Some(injs) = by_node.get(&node_id) {
                    for inj in injs {
                        if inj.site == FaultSite::Input(idx as u32) {
                            v = select(v, inj.forced, inj.mask);
                        }
                    }
                }
                v
            })
            .collect();

        let mut v = if let Gate::Buf(_) = gate {
            fanins.remove(0)
        } else {
            eval_comb(gate, &fanins)
        };

        if let Some(injs) = by_node.get(&node_id) {
            for inj in injs {
                if inj.site == FaultSite::Output {
                    v = select(v, inj.forced, inj.mask);
                }
            }
        }
        values[i] = v;
    }

    let mut next_state = FxHashMap::default();
    for i in 0..n {
        if let Gate::Dff(v) = netlist.network().gate(i) {
            next_state.insert(i as NodeId, read_signal(v[0], &values));
        }
    }
    (values, next_state)
}

fn outputs_differ(netlist: &Netlist, good: &[PackedVal], faulty: &[PackedVal]) -> u64 {
    let mut diff = 0u64;
    for o in 0..netlist.network().nb_outputs() {
        let s = netlist.network().output(o);
        let g = read_output(s, good);
        let f = read_output(s, faulty);
        diff |= (g.v1 & f.v0) | (g.v0 & f.v1);
    }
    diff
}

fn read_output(s: Signal, values: &[PackedVal]) -> PackedVal {
    let v = if s.is_constant() {
        PackedVal::broadcast(false)
    } else if s.is_input() {
        PackedVal::all_x()
    } else {
        values[s.var() as usize]
    };
    apply_inversion(v, s.is_inverted())
}

/// Load one [`TestVector`] into a per-input `PackedVal` array, broadcasting
/// its bits to every lane of the batch.
fn broadcast_pattern(pattern: &TestVector) -> Vec<PackedVal> {
    (0..pattern.len())
        .map(|i| match pattern.get(i) {
            Bit::Zero => PackedVal::broadcast(false),
            Bit::One => PackedVal::broadcast(true),
            Bit::X => PackedVal::all_x(),
        })
        .collect()
}

/// Load up to [`PV_BITLEN`] patterns, one per lane, into per-input
/// `PackedVal`s.
fn load_patterns(patterns: &[TestVector], nb_inputs: usize) -> Vec<PackedVal> {
    let mut pi_values = vec![PackedVal::all_x(); nb_inputs];
    for (lane, pattern) in patterns.iter().enumerate().take(PV_BITLEN) {
        for i in 0..nb_inputs {
            let v = match pattern.get(i) {
                Bit::Zero => Some(false),
                Bit::One => Some(true),
                Bit::X => None,
            };
            pi_values[i].set_lane(lane, v);
        }
    }
    pi_values
}

/// Bit-parallel 3-valued fault simulator over a shared, read-only [`Netlist`].
pub struct FaultSimulator<'a> {
    netlist: &'a Netlist,
}

impl<'a> FaultSimulator<'a> {
    pub fn new(netlist: &'a Netlist) -> FaultSimulator<'a> {
        FaultSimulator { netlist }
    }

    fn injections_for(&self, fault: &Fault, mask: u64, stuck_value: bool) -> Vec<Injection> {
        vec![Injection {
            node: fault.node,
            site: fault.site,
            mask,
            forced: PackedVal::broadcast(stuck_value),
        }]
    }

    /// Single-pattern, single-fault simulation: does `pattern` detect
    /// `fault`? Transition-delay faults are launched in frame 0 with the same
    /// pattern repeated (a standard launch-on-capture style two-pattern test
    /// would supply distinct launch/capture vectors through
    /// [`Self::spsfp_two_pattern`] instead).
    pub fn spsfp(&self, pattern: &TestVector, fault: &Fault) -> bool {
        if fault.needs_two_frames() {
            return self.spsfp_two_pattern(pattern, pattern, fault);
        }
        let pi = broadcast_pattern(pattern);
        let dff_state = FxHashMap::default();
        let (good, _) = simulate_frame(self.netlist, &pi, &dff_state, &[]);
        let injections = self.injections_for(fault, 1, fault.kind.stuck_value() != 0);
        let (faulty, _) = simulate_frame(self.netlist, &pi, &dff_state, &injections);
        outputs_differ(self.netlist, &good, &faulty) & 1 != 0
    }

    /// Two-pattern transition fault test: `launch` establishes the initial
    /// value, `capture` drives the frame where the (missing) transition would
    /// be observed.
    pub fn spsfp_two_pattern(&self, launch: &TestVector, capture: &TestVector, fault: &Fault) -> bool {
        let pi0 = broadcast_pattern(launch);
        let pi1 = broadcast_pattern(capture);
        let (good0, good_next) = simulate_frame(self.netlist, &pi0, &FxHashMap::default(), &[]);
        let (good1, _) = simulate_frame(self.netlist, &pi1, &good_next, &[]);

        let (_, faulty_next) = simulate_frame(self.netlist, &pi0, &FxHashMap::default(), &[]);
        let injections = self.injections_for(fault, 1, fault.kind.stuck_value() != 0);
        let (faulty1, _) = simulate_frame(self.netlist, &pi1, &faulty_next, &injections);

        let _ = good0;
        outputs_differ(self.netlist, &good1, &faulty1) & 1 != 0
    }

    /// Single pattern, up to [`PV_BITLEN`] faults evaluated in parallel (one
    /// fault per lane). Returns one bool per input fault, in order.
    ///
    /// Faults are split within each chunk by [`Fault::needs_two_frames`]:
    /// combinational faults are injected in the only frame simulated, while
    /// transition faults are launched (uninjected) in frame 0 and injected in
    /// a second, capture frame, same as [`Self::spsfp_two_pattern`] with
    /// `pattern` repeated as both launch and capture vector.
    pub fn sppfp(&self, pattern: &TestVector, faults: &[Fault]) -> Vec<bool> {
        let mut results = vec![false; faults.len()];
        for (chunk_idx, chunk) in faults.chunks(PV_BITLEN).enumerate() {
            let pi = broadcast_pattern(pattern);
            let dff_state = FxHashMap::default();
            let (good0, good_next) = simulate_frame(self.netlist, &pi, &dff_state, &[]);

            let comb_injections: Vec<Injection> = chunk
                .iter()
                .enumerate()
                .filter(|(_, f)| !f.needs_two_frames())
                .map(|(lane, f)| Injection {
                    node: f.node,
                    site: f.site,
                    mask: 1u64 << lane,
                    forced: PackedVal::broadcast(f.kind.stuck_value() != 0),
                })
                .collect();
            if !comb_injections.is_empty() {
                let (faulty0, _) = simulate_frame(self.netlist, &pi, &dff_state, &comb_injections);
                let diff = outputs_differ(self.netlist, &good0, &faulty0);
                for (lane, f) in chunk.iter().enumerate() {
                    if !f.needs_two_frames() {
                        results[chunk_idx * PV_BITLEN + lane] = diff & (1u64 << lane) != 0;
                    }
                }
            }

            let trans_injections: Vec<Injection> = chunk
                .iter()
                .enumerate()
                .filter(|(_, f)| f.needs_two_frames())
                .map(|(lane, f)| Injection {
                    node: f.node,
                    site: f.site,
                    mask: 1u64 << lane,
                    forced: PackedVal::broadcast(f.kind.stuck_value() != 0),
                })
                .collect();
            if !trans_injections.is_empty() {
                let (good1, _) = simulate_frame(self.netlist, &pi, &good_next, &[]);
                let (faulty1, _) = simulate_frame(self.netlist, &pi, &good_next, &trans_injections);
                let diff = outputs_differ(self.netlist, &good1, &faulty1);
                for (lane, f) in chunk.iter().enumerate() {
                    if f.needs_two_frames() {
                        results[chunk_idx * PV_BITLEN + lane] = diff & (1u64 << lane) != 0;
                    }
                }
            }
        }
        results
    }

    /// Up to [`PV_BITLEN`] patterns, a single fault evaluated in parallel
    /// (one pattern per lane). Returns one bool per input pattern, in order.
    ///
    /// When `fault` needs two frames, every lane launches (uninjected) in
    /// frame 0 on its own pattern and captures with that same pattern
    /// repeated, injected only in the capture frame, matching
    /// [`Self::spsfp_two_pattern`] applied lane-wise.
    pub fn ppsfp(&self, patterns: &[TestVector], fault: &Fault) -> Vec<bool> {
        let nb_inputs = self.netlist.network().nb_inputs();
        let mut results = vec![false; patterns.len()];
        for (chunk_idx, chunk) in patterns.chunks(PV_BITLEN).enumerate() {
            let pi = load_patterns(chunk, nb_inputs);
            let dff_state = FxHashMap::default();
            let mask = if chunk.len() == PV_BITLEN { !0u64 } else { (1u64 << chunk.len()) - 1 };
            let injections = self.injections_for(fault, mask, fault.kind.stuck_value() != 0);

            let diff = if fault.needs_two_frames() {
                let (_, good_next) = simulate_frame(self.netlist, &pi, &dff_state, &[]);
                let (good1, _) = simulate_frame(self.netlist, &pi, &good_next, &[]);
                let (faulty1, _) = simulate_frame(self.netlist, &pi, &good_next, &injections);
                outputs_differ(self.netlist, &good1, &faulty1)
            } else {
                let (good, _) = simulate_frame(self.netlist, &pi, &dff_state, &[]);
                let (faulty, _) = simulate_frame(self.netlist, &pi, &dff_state, &injections);
                outputs_differ(self.netlist, &good, &faulty)
            };
            for lane in 0..chunk.len() {
                results[chunk_idx * PV_BITLEN + lane] = diff & (1u64 << lane) != 0;
            }
        }
        results
    }

    /// Weighted switching activity across a sequence of patterns: the number
    /// of 0<->1 transitions on every internal node, summed over consecutive
    /// pattern pairs. Used for the CLI's `simulate --wsa` report.
    pub fn calc_wsa(&self, patterns: &[TestVector]) -> u64 {
        if patterns.len() < 2 {
            return 0;
        }
        let mut total = 0u64;
        let mut dff_state = FxHashMap::default();
        let mut prev: Option<Vec<PackedVal>> = None;
        for pattern in patterns {
            let pi = broadcast_pattern(pattern);
            let (values, next) = simulate_frame(self.netlist, &pi, &dff_state, &[]);
            if let Some(prev_values) = &prev {
                for i in 0..values.len() {
                    let toggled = (prev_values[i].v0 & values[i].v1) | (prev_values[i].v1 & values[i].v0);
                    total += (toggled & 1).count_ones() as u64;
                }
            }
            dff_state = next;
            prev = Some(values);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::network::Network;

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
    fn test_spsfp_detects_sa0_on_and_output() {
        let nl = and_netlist();
        let sim = FaultSimulator::new(&nl);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        assert!(sim.spsfp(&pattern(&[1, 1]), &fault));
        assert!(!sim.spsfp(&pattern(&[0, 1]), &fault));
    }

    #[test]
    fn test_sppfp_matches_spsfp() {
        let nl = and_netlist();
        let sim = FaultSimulator::new(&nl);
        let f0 = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        let f1 = Fault {
            id: 1,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt1,
        };
        let p = pattern(&[1, 1]);
        let res = sim.sppfp(&p, &[f0, f1]);
        assert_eq!(res[0], sim.spsfp(&p, &f0));
        assert_eq!(res[1], sim.spsfp(&p, &f1));
    }

    #[test]
    fn test_ppsfp_matches_spsfp() {
        let nl = and_netlist();
        let sim = FaultSimulator::new(&nl);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        let patterns = vec![pattern(&[1, 1]), pattern(&[0, 1]), pattern(&[1, 0])];
        let res = sim.ppsfp(&patterns, &fault);
        for (p, r) in patterns.iter().zip(res.iter()) {
            assert_eq!(*r, sim.spsfp(p, &fault));
        }
    }

    #[test]
    fn test_sppfp_matches_spsfp_for_transition_fault() {
        let nl = and_netlist();
        let sim = FaultSimulator::new(&nl);
        let comb = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        let trans = Fault {
            id: 1,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::SlowToRise,
        };
        let p = pattern(&[1, 1]);
        let res = sim.sppfp(&p, &[comb, trans]);
        assert_eq!(res[0], sim.spsfp(&p, &comb));
        assert_eq!(res[1], sim.spsfp(&p, &trans));
    }

    #[test]
    fn test_ppsfp_matches_spsfp_for_transition_fault() {
        let nl = and_netlist();
        let sim = FaultSimulator::new(&nl);
        let fault = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::SlowToRise,
        };
        let patterns = vec![pattern(&[1, 1]), pattern(&[0, 1]), pattern(&[1, 0])];
        let res = sim.ppsfp(&patterns, &fault);
        for (p, r) in patterns.iter().zip(res.iter()) {
            assert_eq!(*r, sim.spsfp(p, &fault));
        }
    }
}
