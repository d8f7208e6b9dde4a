//! Boolean-difference (fault propagation) encoding: a parallel "faulty"
//! circuit evaluated under the same primary-input assignment, diverging only
//! where the fault's excitation reaches, with a `prop_var` literal asserting
//! the divergence reaches an observable point.

use crate::engine::{Scope, StructEngine, SubEnc, TimeFrame};
use crate::fault::{Fault, FaultSite};
use crate::network::{Gate, NodeId};
use fxhash::{FxHashMap, FxHashSet};
use rustsat::types::Lit;

/// Builds and owns the `fvar`/`dvar` chain propagating a single fault's
/// effect forward from its site to every primary output and flip-flop input
/// (pseudo-output, under the full-scan assumption) it can structurally reach.
pub struct BoolDiffEnc {
    scope: Scope,
    flit: FxHashMap<NodeId, Lit>,
    dvar: FxHashMap<NodeId, Lit>,
    prop_var: Lit,
}

impl BoolDiffEnc {
    /// Build the encoding for `fault` at `time`, against `engine`'s good
    /// circuit. `time` is the capture frame: for a combinational query this
    /// is frame 0; for a transition-delay fault it is frame 1, with the
    /// excitation condition on frame 0 left to the caller (`FaultEnc`).
    pub fn new(engine: &mut StructEngine, fault: &Fault, time: TimeFrame) -> BoolDiffEnc {
        Self::new_restricted(engine, fault, time, None)
    }

    /// Build the encoding with the cone restricted to `restrict`, if given
    /// (used by [`super::ffr_enc::FfrEnc`]/[`super::mffc_enc::MffcEnc`] to
    /// keep the query local instead of spanning the whole design). Boundary
    /// nodes (where `prop_var` is asserted) are the restricted cone's leaves
    /// when `restrict` is set, or the design's primary outputs/flip-flop
    /// inputs otherwise.
    pub fn new_restricted(
        engine: &mut StructEngine,
        fault: &Fault,
        time: TimeFrame,
        restrict: Option<&FxHashSet<NodeId>>,
    ) -> BoolDiffEnc {
        let mut cone = Self::tfo_cone(engine, fault.node);
        if let Some(r) = restrict {
            cone.retain(|n| r.contains(n));
        }
        let mut scope = Scope::new();
        for &n in &cone {
            scope.add_cur(n);
        }

        let mut flit: FxHashMap<NodeId, Lit> = FxHashMap::default();
        // Order the cone so that every node is processed after its in-cone
        // fanins: node ids are topologically increasing in a combinational
        // netlist, except across a Dff boundary, which this cone never
        // crosses (see `tfo_cone`).
        let mut ordered: Vec<NodeId> = cone.iter().copied().collect();
        ordered.sort();

        for &n in &ordered {
            let gate = engine.netlist().network().gate(n as usize).clone();
            if n == fault.node && matches!(fault.site, FaultSite::Output) {
                let stuck = fault.kind.stuck_value() == 1;
                let l = engine.new_variable();
                engine.add_clause(&[if stuck { l } else { !l }]);
                flit.insert(n, l);
                continue;
            }
            let deps = gate.dependencies();
            let in_lits: Vec<Lit> = deps
                .iter()
                .map(|s| {
                    if s.is_var() && flit.contains_key(&s.var()) {
                        let base = flit[&s.var()];
                        if s.is_inverted() {
                            !base
                        } else {
                            base
                        }
                    } else {
                        engine.conv_to_literal(*s, time)
                    }
                })
                .collect();
            let forced_inputs: Vec<Lit> = in_lits
                .iter()
                .enumerate()
                .map(|(i, &l)| {
                    if n == fault.node {
                        if let FaultSite::Input(idx) = fault.site {
                            if idx as usize == i {
                                let forced = engine.new_variable();
                                let stuck = fault.kind.stuck_value() == 1;
                                engine.add_clause(&[if stuck { forced } else { !forced }]);
                                return forced;
                            }
                        }
                    }
                    l
                })
                .collect();
            let l = encode_faulty_gate(engine, &gate, &forced_inputs);
            flit.insert(n, l);
        }

        let mut dvar: FxHashMap<NodeId, Lit> = FxHashMap::default();
        for &n in &ordered {
            let glit = engine.var(n, time);
            let f = flit[&n];
            let d = engine.new_variable();
            // dvar <-> glit XOR flit
            engine.add_clause(&[!d, glit, f]);
            engine.add_clause(&[!d, !glit, !f]);
            engine.add_clause(&[d, !glit, f]);
            engine.add_clause(&[d, glit, !f]);
            dvar.insert(n, d);
        }

        let boundary: Vec<Lit> = ordered
            .iter()
            .filter(|&&n| match restrict {
                Some(r) => engine.netlist().fanouts(n).iter().any(|fo| !r.contains(fo)) || is_boundary(engine, n),
                None => is_boundary(engine, n),
            })
            .map(|&n| dvar[&n])
            .collect();
        let prop_var = engine.new_variable();
        if boundary.is_empty() {
            engine.add_clause(&[!prop_var]);
        } else {
            let mut clause = vec![!prop_var];
            clause.extend(boundary.iter().copied());
            engine.add_clause(&clause);
            for &b in &boundary {
                engine.add_clause(&[prop_var, !b]);
            }
        }

        BoolDiffEnc {
            scope,
            flit,
            dvar,
            prop_var,
        }
    }

    fn tfo_cone(engine: &StructEngine, root: NodeId) -> FxHashSet<NodeId> {
        let mut cone = FxHashSet::default();
        engine.netlist().tfo(&[root], |n| {
            cone.insert(n);
        });
        cone
    }

    pub fn prop_var(&self) -> Lit {
        self.prop_var
    }

    pub fn dvar(&self, node: NodeId) -> Option<Lit> {
        self.dvar.get(&node).copied()
    }

    pub fn flit(&self, node: NodeId) -> Option<Lit> {
        self.flit.get(&node).copied()
    }
}

impl SubEnc for BoolDiffEnc {
    fn scope(&self) -> &Scope {
        &self.scope
    }
}

fn is_boundary(engine: &StructEngine, node: NodeId) -> bool {
    engine.netlist().fanouts(node).is_empty() || is_pseudo_output(engine, node)
}

fn is_pseudo_output(engine: &StructEngine, node: NodeId) -> bool {
    for &fo in engine.netlist().fanouts(node) {
        if matches!(engine.netlist().network().gate(fo as usize), Gate::Dff(_)) {
            return true;
        }
    }
    for o in 0..engine.netlist().network().nb_outputs() {
        let s = engine.netlist().network().output(o);
        if s.is_var() && s.var() == node {
            return true;
        }
    }
    false
}

fn encode_faulty_gate(engine: &mut StructEngine, gate: &Gate, in_lits: &[Lit]) -> Lit {
    use crate::network::{BinaryType, NaryType, TernaryType};
    let out = engine.new_variable();
    let sat = engine.sat_adapter_mut();
    match gate {
        Gate::Binary(_, BinaryType::And) => sat.add_and_gate(out, in_lits[0], in_lits[1]),
        Gate::Binary(_, BinaryType::Xor) => sat.add_xor_gate(out, in_lits[0], in_lits[1]),
        Gate::Ternary(_, TernaryType::And) => {
            let tmp = sat.new_variable();
            sat.add_and_gate(tmp, in_lits[0], in_lits[1]).unwrap();
            sat.add_and_gate(out, tmp, in_lits[2])
        }
        Gate::Ternary(_, TernaryType::Xor) => {
            let tmp = sat.new_variable();
            sat.add_xor_gate(tmp, in_lits[0], in_lits[1]).unwrap();
            sat.add_xor_gate(out, tmp, in_lits[2])
        }
        Gate::Ternary(_, TernaryType::Maj) => sat.add_maj_gate(out, in_lits[0], in_lits[1], in_lits[2]),
        Gate::Ternary(_, TernaryType::Mux) => sat.add_mux_gate(out, in_lits[0], in_lits[1], in_lits[2]),
        Gate::Nary(_, NaryType::And) => sat.add_and_n(out, in_lits),
        Gate::Nary(_, NaryType::Or) => sat.add_or_n(out, in_lits),
        Gate::Nary(_, NaryType::Nand) => {
            let tmp = sat.new_variable();
            sat.add_and_n(tmp, in_lits).unwrap();
            sat.add_buffer(out, !tmp)
        }
        Gate::Nary(_, NaryType::Nor) => {
            let tmp = sat.new_variable();
            sat.add_or_n(tmp, in_lits).unwrap();
            sat.add_buffer(out, !tmp)
        }
        Gate::Nary(_, NaryType::Xor | NaryType::Xnor) => {
            let mut acc = in_lits[0];
            for &l in &in_lits[1..in_lits.len() - 1] {
                let tmp = sat.new_variable();
                sat.add_xor_gate(tmp, acc, l).unwrap();
                acc = tmp;
            }
            let last = in_lits[in_lits.len() - 1];
            let invert = matches!(gate, Gate::Nary(_, NaryType::Xnor));
            let lhs = if invert { !acc } else { acc };
            sat.add_xor_gate(out, lhs, last)
        }
        Gate::Buf(_) => sat.add_buffer(out, in_lits[0]),
        Gate::Dff(_) => unreachable!("Dff is a cone boundary, never re-encoded as faulty"),
    }
    .expect("faulty gate encoding");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::network::{Netlist, Network};
    use crate::sat::SatResult;

    #[test]
    fn test_bool_diff_detects_and_sa0() {
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
            kind: FaultKind::StuckAt0,
        };
        let bd = BoolDiffEnc::new(&mut eng, &fault, 0);
        let a0 = eng.conv_to_literal(crate::network::Signal::from_input(0), 0);
        let a1 = eng.conv_to_literal(crate::network::Signal::from_input(1), 0);
        let res = eng.solve(&[a0, a1, bd.prop_var()]);
        assert_eq!(res, SatResult::True);
    }
}
