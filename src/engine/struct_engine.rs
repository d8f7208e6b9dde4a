//! Lazy structural CNF of the fault-free ("good") circuit, over one or two
//! time frames. A node's clauses are only generated the first time a literal
//! for it is requested, following its transitive fanin; callers (the
//! Boolean-difference encoder, the fault encoders, the justifier) pull
//! literals through [`StructEngine::var`]/[`StructEngine::conv_to_literal`]
//! as they need them rather than being pushed a notification.

use crate::network::{BinaryType, Gate, NaryType, Netlist, NodeId, Signal, TernaryType};
use crate::sat::{SatAdapter, SatResult};
use fxhash::FxHashMap;
use rustsat::types::Lit;

/// A node at a specific time frame: `0` is the frame furthest in the past
/// (the launch frame for a transition-delay pair), `1` is the capture frame.
pub type TimeFrame = u8;

/// Structural SAT encoder for the good circuit, built lazily.
pub struct StructEngine<'a> {
    netlist: &'a Netlist,
    sat: SatAdapter,
    nb_frames: TimeFrame,
    node_vars: FxHashMap<(NodeId, TimeFrame), Lit>,
    pi_vars: FxHashMap<(u32, TimeFrame), Lit>,
    const_lit: Option<Lit>,
}

impl<'a> StructEngine<'a> {
    pub fn new(netlist: &'a Netlist, nb_frames: TimeFrame) -> StructEngine<'a> {
        assert!(nb_frames == 1 || nb_frames == 2);
        StructEngine {
            netlist,
            sat: SatAdapter::new(),
            nb_frames,
            node_vars: FxHashMap::default(),
            pi_vars: FxHashMap::default(),
            const_lit: None,
        }
    }

    pub fn netlist(&self) -> &Netlist {
        self.netlist
    }

    pub fn nb_frames(&self) -> TimeFrame {
        self.nb_frames
    }

    fn pi_var(&mut self, input: u32, time: TimeFrame) -> Lit {
        if let Some(&l) = self.pi_vars.get(&(input, time)) {
            return l;
        }
        let l = self.sat.new_variable();
        self.pi_vars.insert((input, time), l);
        l
    }

    fn constant_lit(&mut self) -> Lit {
        if let Some(l) = self.const_lit {
            return l;
        }
        let l = self.sat.new_variable();
        self.sat.add_clause(&[l]).expect("unit clause");
        self.const_lit = Some(l);
        l
    }

    /// The literal for `signal` at `time`, building any missing CNF along the
    /// way.
    pub fn conv_to_literal(&mut self, signal: Signal, time: TimeFrame) -> Lit {
        if signal.is_constant() {
            let base = self.constant_lit();
            return if signal.is_inverted() { !base } else { base };
        }
        let base = if signal.is_input() {
            self.pi_var(signal.input(), time)
        } else {
            self.var(signal.var(), time)
        };
        if signal.is_inverted() {
            !base
        } else {
            base
        }
    }

    /// The literal for the whole cube: a positive literal per assignment,
    /// negated where the assignment pins the node to 0.
    pub fn conv_to_literal_list(&mut self, assigns: &crate::assign::AssignList) -> Vec<Lit> {
        assigns
            .iter()
            .map(|a| {
                let lit = self.var(a.node, a.time);
                if a.value == 1 {
                    lit
                } else {
                    !lit
                }
            })
            .collect()
    }

    /// The literal for gate `node`'s output at `time`, building its CNF (and
    /// its transitive fanin's) on demand.
    pub fn var(&mut self, node: NodeId, time: TimeFrame) -> Lit {
        if let Some(&l) = self.node_vars.get(&(node, time)) {
            return l;
        }
        let lit = self.build(node, time);
        self.node_vars.insert((node, time), lit);
        lit
    }

    fn build(&mut self, node: NodeId, time: TimeFrame) -> Lit {
        let gate = self.netlist.network().gate(node as usize).clone();
        if let Gate::Dff(v) = &gate {
            let out = self.sat.new_variable();
            if time > 0 {
                let data_lit = self.conv_to_literal(v[0], time - 1);
                self.sat.add_buffer(out, data_lit).expect("dff peer buffer");
            }
            // At time 0 the flip-flop's state is a free (pseudo-primary-input)
            // variable: nothing further to constrain.
            return out;
        }
        let deps = gate.dependencies();
        let in_lits: Vec<Lit> = deps.iter().map(|s| self.conv_to_literal(*s, time)).collect();
        let out = self.sat.new_variable();
        match &gate {
            Gate::Binary(_, BinaryType::And) => self.sat.add_and_gate(out, in_lits[0], in_lits[1]).unwrap(),
            Gate::Binary(_, BinaryType::Xor) => self.sat.add_xor_gate(out, in_lits[0], in_lits[1]).unwrap(),
            Gate::Ternary(_, TernaryType::And) => {
                let tmp = self.sat.new_variable();
                self.sat.add_and_gate(tmp, in_lits[0], in_lits[1]).unwrap();
                self.sat.add_and_gate(out, tmp, in_lits[2]).unwrap();
            }
            Gate::Ternary(_, TernaryType::Xor) => {
                let tmp = self.sat.new_variable();
                self.sat.add_xor_gate(tmp, in_lits[0], in_lits[1]).unwrap();
                self.sat.add_xor_gate(out, tmp, in_lits[2]).unwrap();
            }
            Gate::Ternary(_, TernaryType::Maj) => {
                self.sat.add_maj_gate(out, in_lits[0], in_lits[1], in_lits[2]).unwrap()
            }
            Gate::Ternary(_, TernaryType::Mux) => {
                self.sat.add_mux_gate(out, in_lits[0], in_lits[1], in_lits[2]).unwrap()
            }
            Gate::Nary(_, NaryType::And) => self.sat.add_and_n(out, &in_lits).unwrap(),
            Gate::Nary(_, NaryType::Or) => self.sat.add_or_n(out, &in_lits).unwrap(),
            Gate::Nary(_, NaryType::Nand) => {
                let tmp = self.sat.new_variable();
                self.sat.add_and_n(tmp, &in_lits).unwrap();
                self.sat.add_buffer(out, !tmp).unwrap();
            }
            Gate::Nary(_, NaryType::Nor) => {
                let tmp = self.sat.new_variable();
                self.sat.add_or_n(tmp, &in_lits).unwrap();
                self.sat.add_buffer(out, !tmp).unwrap();
            }
            Gate::Nary(_, NaryType::Xor) => self.fold_xor_chain(out, &in_lits, false),
            Gate::Nary(_, NaryType::Xnor) => self.fold_xor_chain(out, &in_lits, true),
            Gate::Buf(_) => self.sat.add_buffer(out, in_lits[0]).unwrap(),
            Gate::Dff(_) => unreachable!("handled above"),
        }
        out
    }

    fn fold_xor_chain(&mut self, out: Lit, in_lits: &[Lit], invert: bool) {
        let mut acc = in_lits[0];
        for &l in &in_lits[1..in_lits.len() - 1] {
            let tmp = self.sat.new_variable();
            self.sat.add_xor_gate(tmp, acc, l).unwrap();
            acc = tmp;
        }
        let last = in_lits[in_lits.len() - 1];
        let lhs = if invert { !acc } else { acc };
        self.sat.add_xor_gate(out, lhs, last).unwrap();
    }

    pub fn add_clause(&mut self, lits: &[Lit]) {
        self.sat.add_clause(lits).expect("clause");
    }

    pub fn new_variable(&mut self) -> Lit {
        self.sat.new_variable()
    }

    pub fn solve(&mut self, assumptions: &[Lit]) -> SatResult {
        self.sat.solve(assumptions).unwrap_or(SatResult::Aborted)
    }

    pub fn val(&mut self, lit: Lit) -> Option<bool> {
        self.sat.value(lit)
    }

    pub fn get_pi_assign(&mut self, time: TimeFrame) -> Vec<(u32, bool)> {
        let mut out = Vec::new();
        for input in 0..self.netlist.network().nb_inputs() as u32 {
            if let Some(&lit) = self.pi_vars.get(&(input, time)) {
                if let Some(v) = self.sat.value(lit) {
                    out.push((input, v));
                }
            }
        }
        out
    }

    pub fn sat_adapter_mut(&mut self) -> &mut SatAdapter {
        &mut self.sat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_and_gate_encoding() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        let nl = Netlist::build(net);
        let mut eng = StructEngine::new(&nl, 1);
        let out_lit = eng.var(0, 0);
        let a_lit = eng.conv_to_literal(Signal::from_input(0), 0);
        let b_lit = eng.conv_to_literal(Signal::from_input(1), 0);
        let res = eng.solve(&[a_lit, b_lit]);
        assert_eq!(res, SatResult::True);
        assert_eq!(eng.val(out_lit), Some(true));
    }

    #[test]
    fn test_dff_peer_across_frames() {
        let mut net = Network::new();
        let inputs = net.add_inputs(1);
        let q = net.dff(inputs[0], Signal::zero(), Signal::one());
        net.add_output(q);
        let nl = Netlist::build(net);
        let mut eng = StructEngine::new(&nl, 2);
        let q_lit_frame1 = eng.var(0, 1);
        let data_lit_frame0 = eng.conv_to_literal(Signal::from_input(0), 0);
        let res = eng.solve(&[data_lit_frame0]);
        assert_eq!(res, SatResult::True);
        assert_eq!(eng.val(q_lit_frame1), Some(true));
    }
}
