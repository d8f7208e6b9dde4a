//! The ATPG-facing view of a [`Network`]: fanout bookkeeping and the
//! fanout-free-region (FFR) / maximal-fanout-free-cone (MFFC) decomposition
//! that the SAT encoders and fault-reduction pipeline are built around.

use super::gates::Gate;
use super::network::Network;
use super::signal::Signal;
use fxhash::{FxHashMap, FxHashSet};

/// Stable identifier of a gate-level node. Equal to its index in the
/// underlying [`Network`].
pub type NodeId = u32;

/// Stable identifier of a fanout-free region.
pub type FfrId = u32;

/// Stable identifier of a maximal fanout-free cone.
pub type MffcId = u32;

/// A fanout-free region: a maximal set of nodes with single fanout, rooted at
/// a node that either has multiple fanouts, drives a primary output, or
/// drives a flip-flop input.
#[derive(Clone, Debug)]
pub struct Ffr {
    pub id: FfrId,
    pub root: NodeId,
    pub members: Vec<NodeId>,
}

/// A maximal fanout-free cone: the FFR at `root` plus every FFR that feeds it
/// exclusively (no path to any other root).
#[derive(Clone, Debug)]
pub struct Mffc {
    pub id: MffcId,
    pub root: NodeId,
    pub ffrs: Vec<FfrId>,
}

/// Wraps a [`Network`] with the fanout graph and FFR/MFFC decomposition used
/// by the ATPG engines. Built once per design and shared read-only across
/// worker threads.
pub struct Netlist {
    network: Network,
    fanouts: Vec<Vec<NodeId>>,
    ffr_of: Vec<FfrId>,
    ffrs: Vec<Ffr>,
    mffc_of: Vec<MffcId>,
    mffcs: Vec<Mffc>,
}

impl Netlist {
    pub fn build(network: Network) -> Netlist {
        let n = network.nb_nodes();
        let mut fanouts = vec![Vec::new(); n];
        for i in 0..n {
            for s in network.gate(i).dependencies() {
                if s.is_var() {
                    fanouts[s.var() as usize].push(i as NodeId);
                }
            }
        }
        let mut is_po_driver = vec![false; n];
        for o in 0..network.nb_outputs() {
            let s = network.output(o);
            if s.is_var() {
                is_po_driver[s.var() as usize] = true;
            }
        }
        let mut is_dff_input = vec![false; n];
        for i in 0..n {
            if let Gate::Dff(v) = network.gate(i) {
                if v[0].is_var() {
                    is_dff_input[v[0].var() as usize] = true;
                }
            }
        }

        let mut ffr_of = vec![FfrId::MAX; n];
        let mut ffrs = Vec::new();
        let is_root = |i: usize| -> bool {
            fanouts[i].len() != 1 || is_po_driver[i] || is_dff_input[i] || matches!(network.gate(i), Gate::Dff(_))
        };
        for i in (0..n).rev() {
            if ffr_of[i] != FfrId::MAX {
                continue;
            }
            if !is_root(i) {
                continue;
            }
            let ffr_id = ffrs.len() as FfrId;
            let mut members = Vec::new();
            let mut stack = vec![i as NodeId];
            while let Some(cur) = stack.pop() {
                if ffr_of[cur as usize] != FfrId::MAX {
                    continue;
                }
                ffr_of[cur as usize] = ffr_id;
                members.push(cur);
                if matches!(network.gate(cur as usize), Gate::Dff(_)) {
                    continue;
                }
                for s in network.gate(cur as usize).dependencies() {
                    if s.is_var() {
                        let v = s.var();
                        if !is_root(v as usize) {
                            stack.push(v);
                        }
                    }
                }
            }
            members.sort();
            ffrs.push(Ffr {
                id: ffr_id,
                root: i as NodeId,
                members,
            });
        }
        // Any remaining un-rooted node (all gates should have been claimed by
        // the sweep above, since every node is either a root or feeds exactly
        // one fanout that is eventually a root).
        for i in 0..n {
            if ffr_of[i] == FfrId::MAX {
                let ffr_id = ffrs.len() as FfrId;
                ffr_of[i] = ffr_id;
                ffrs.push(Ffr {
                    id: ffr_id,
                    root: i as NodeId,
                    members: vec![i as NodeId],
                });
            }
        }

        let (mffc_of, mffcs) = build_mffcs(&network, &fanouts, &ffrs, &ffr_of);

        Netlist {
            network,
            fanouts,
            ffr_of,
            ffrs,
            mffc_of,
            mffcs,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn nb_nodes(&self) -> usize {
        self.network.nb_nodes()
    }

    pub fn fanouts(&self, n: NodeId) -> &[NodeId] {
        &self.fanouts[n as usize]
    }

    pub fn fanin_signals(&self, n: NodeId) -> Vec<Signal> {
        self.network.gate(n as usize).dependencies()
    }

    pub fn ffr_of(&self, n: NodeId) -> FfrId {
        self.ffr_of[n as usize]
    }

    pub fn ffr(&self, id: FfrId) -> &Ffr {
        &self.ffrs[id as usize]
    }

    pub fn ffrs(&self) -> &[Ffr] {
        &self.ffrs
    }

    pub fn mffc_of(&self, n: NodeId) -> MffcId {
        self.mffc_of[self.ffr_of[n as usize] as usize]
    }

    pub fn mffc(&self, id: MffcId) -> &Mffc {
        &self.mffcs[id as usize]
    }

    pub fn mffcs(&self) -> &[Mffc] {
        &self.mffcs
    }

    /// Transitive fanin closure of `roots`, stopping at primary inputs and
    /// flip-flop outputs, calling `visit` for each internal node reached
    /// (including the roots themselves).
    pub fn tfi<F: FnMut(NodeId)>(&self, roots: &[NodeId], mut visit: F) {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            visit(cur);
            if matches!(self.network.gate(cur as usize), Gate::Dff(_)) {
                continue;
            }
            for s in self.network.gate(cur as usize).dependencies() {
                if s.is_var() {
                    stack.push(s.var());
                }
            }
        }
    }

    /// Transitive fanout closure of `roots`, stopping at primary outputs and
    /// flip-flop inputs.
    pub fn tfo<F: FnMut(NodeId)>(&self, roots: &[NodeId], mut visit: F) {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            visit(cur);
            for &fo in &self.fanouts[cur as usize] {
                stack.push(fo);
            }
        }
    }
}

fn build_mffcs(
    network: &Network,
    fanouts: &[Vec<NodeId>],
    ffrs: &[Ffr],
    ffr_of: &[FfrId],
) -> (Vec<MffcId>, Vec<Mffc>) {
    // An MFFC groups an FFR with every FFR whose every fanout path leads
    // exclusively into it, i.e. the predecessor FFR has no fanout escaping the
    // successor's dominance. We compute this with the classic "all fanouts of
    // every member lie within the cone" dominance test, FFR by FFR, from
    // outputs inward so that child FFRs are resolved before their parents.
    let n = network.nb_nodes();
    let mut mffc_of = vec![MffcId::MAX; ffrs.len()];
    let mut mffcs: Vec<Mffc> = Vec::new();

    // Map node -> owning ffr already available via ffr_of.
    let mut order: Vec<FfrId> = (0..ffrs.len() as FfrId).collect();
    order.sort_by_key(|&f| std::cmp::Reverse(ffrs[f as usize].root));

    for &ffr_id in &order {
        if mffc_of[ffr_id as usize] != MffcId::MAX {
            continue;
        }
        let mffc_id = mffcs.len() as MffcId;
        let mut member_ffrs = vec![ffr_id];
        mffc_of[ffr_id as usize] = mffc_id;
        // A node is "dominated" by the MFFC root if every fanout path from it
        // stays inside the MFFC under construction. Grow greedily: for each
        // FFR already included, check each of its member nodes' fanin FFRs;
        // include a fanin FFR if all of its fanouts land on nodes already
        // known to be inside the MFFC.
        let mut inside: FxHashSet<NodeId> = FxHashSet::default();
        for &f in &member_ffrs {
            inside.extend(ffrs[f as usize].members.iter().copied());
        }
        loop {
            let mut grew = false;
            let mut candidates: FxHashSet<FfrId> = FxHashSet::default();
            for &f in &member_ffrs {
                for &m in &ffrs[f as usize].members {
                    if matches!(network.gate(m as usize), Gate::Dff(_)) {
                        continue;
                    }
                    for s in network.gate(m as usize).dependencies() {
                        if s.is_var() {
                            let cand_ffr = ffr_of[s.var() as usize];
                            if cand_ffr != ffr_id && !member_ffrs.contains(&cand_ffr) {
                                candidates.insert(cand_ffr);
                            }
                        }
                    }
                }
            }
            for cand in candidates {
                if mffc_of[cand as usize] != MffcId::MAX {
                    continue;
                }
                let all_inside = ffrs[cand as usize]
                    .members
                    .iter()
                    .all(|m| fanouts[*m as usize].iter().all(|fo| inside.contains(fo)) || inside.contains(m));
                if all_inside {
                    member_ffrs.push(cand);
                    inside.extend(ffrs[cand as usize].members.iter().copied());
                    mffc_of[cand as usize] = mffc_id;
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        mffcs.push(Mffc {
            id: mffc_id,
            root: ffrs[ffr_id as usize].root,
            ffrs: member_ffrs,
        });
    }
    let _ = n;
    (mffc_of, mffcs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_netlist() -> Netlist {
        let mut net = Network::new();
        let inputs = net.add_inputs(3);
        let a = net.and(inputs[0], inputs[1]);
        let b = net.xor(a, inputs[2]);
        let c = net.and(a, inputs[2]);
        net.add_output(b);
        net.add_output(c);
        Netlist::build(net)
    }

    #[test]
    fn test_ffr_decomposition() {
        let nl = small_netlist();
        // `a` has fanout 2 (b and c), so it must be its own FFR root.
        let a_id = 0u32;
        assert_eq!(nl.ffr(nl.ffr_of(a_id)).root, a_id);
        assert!(nl.ffrs().len() >= 3);
    }

    #[test]
    fn test_tfi_tfo() {
        let nl = small_netlist();
        let mut seen = Vec::new();
        nl.tfi(&[1], |n| seen.push(n));
        assert!(seen.contains(&0));
        let mut fanout_seen = Vec::new();
        nl.tfo(&[0], |n| fanout_seen.push(n));
        assert!(fanout_seen.contains(&1) && fanout_seen.contains(&2));
    }
}
