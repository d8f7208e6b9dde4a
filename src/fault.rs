//! The fault model: single stuck-at and transition-delay faults located at a
//! node's output or one of its inputs.

use crate::assign::{Assign, AssignList};
use crate::network::{Gate, Netlist, NodeId};
use std::fmt;

/// Which value a stuck-at fault pins a line to, or which transition a
/// transition-delay fault blocks.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum FaultKind {
    /// Line permanently reads 0.
    StuckAt0,
    /// Line permanently reads 1.
    StuckAt1,
    /// Line fails to rise from 0 to 1 across the launch/capture frame pair.
    SlowToRise,
    /// Line fails to fall from 1 to 0 across the launch/capture frame pair.
    SlowToFall,
}

impl FaultKind {
    pub fn is_transition_delay(&self) -> bool {
        matches!(self, FaultKind::SlowToRise | FaultKind::SlowToFall)
    }

    /// The faulty value the stuck line exhibits in the capture frame.
    pub fn stuck_value(&self) -> u8 {
        match self {
            FaultKind::StuckAt0 | FaultKind::SlowToFall => 0,
            FaultKind::StuckAt1 | FaultKind::SlowToRise => 1,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            FaultKind::StuckAt0 => "SA0",
            FaultKind::StuckAt1 => "SA1",
            FaultKind::SlowToRise => "STR",
            FaultKind::SlowToFall => "STF",
        };
        write!(f, "{}", s)
    }
}

/// Which terminal of the node the fault sits on: the gate output, or one of
/// its numbered fanins.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum FaultSite {
    Output,
    Input(u32),
}

/// Stable, dense identifier of a fault, used to index `FaultInfo` tables and
/// bit-parallel fault-simulation slots.
pub type FaultId = u32;

/// A single stuck-at or transition-delay fault.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Fault {
    pub id: FaultId,
    pub node: NodeId,
    pub site: FaultSite,
    pub kind: FaultKind,
}

impl Fault {
    /// The minimal single-cube condition that excites the fault: the
    /// assignment the faulty site must receive on its *good* side for the
    /// fault effect to differ from the fault-free circuit.
    ///
    /// For a stuck-at fault this is simply the opposite of the stuck value.
    /// For a transition-delay fault it is a pair of assignments across the
    /// launch (time 0) and capture (time 1) frames establishing the
    /// required transition.
    pub fn excitation_condition(&self, _netlist: &Netlist) -> AssignList {
        match self.kind {
            FaultKind::StuckAt0 => AssignList::single(Assign::new(self.node, 0, 1)),
            FaultKind::StuckAt1 => AssignList::single(Assign::new(self.node, 0, 0)),
            FaultKind::SlowToRise => {
                AssignList::from_sorted(vec![Assign::new(self.node, 0, 0), Assign::new(self.node, 1, 1)])
            }
            FaultKind::SlowToFall => {
                AssignList::from_sorted(vec![Assign::new(self.node, 0, 1), Assign::new(self.node, 1, 0)])
            }
        }
    }

    /// Whether this fault requires two time frames to excite and observe.
    pub fn needs_two_frames(&self) -> bool {
        self.kind.is_transition_delay()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.site {
            FaultSite::Output => write!(f, "n{}/o {}", self.node, self.kind),
            FaultSite::Input(i) => write!(f, "n{}/i{} {}", self.node, i, self.kind),
        }
    }
}

/// Enumerate every single stuck-at fault in `netlist`: one fault at the
/// output of every node, plus one fault at every fanin of every node whose
/// driving node has fanout greater than one (fanin faults on a single-fanout
/// line are equivalent to the corresponding output fault and are skipped,
/// following the usual ATPG fault-collapsing convention).
pub fn collapsed_stuck_at_faults(netlist: &Netlist) -> Vec<Fault> {
    let mut faults = Vec::new();
    let mut next_id: FaultId = 0;
    for n in 0..netlist.nb_nodes() as NodeId {
        for kind in [FaultKind::StuckAt0, FaultKind::StuckAt1] {
            faults.push(Fault {
                id: next_id,
                node: n,
                site: FaultSite::Output,
                kind,
            });
            next_id += 1;
        }
        for (i, s) in netlist.fanin_signals(n).iter().enumerate() {
            if s.is_var() && netlist.fanouts(s.var()).len() > 1 {
                for kind in [FaultKind::StuckAt0, FaultKind::StuckAt1] {
                    faults.push(Fault {
                        id: next_id,
                        node: n,
                        site: FaultSite::Input(i as u32),
                        kind,
                    });
                    next_id += 1;
                }
            }
        }
    }
    faults
}

/// Enumerate every collapsed transition-delay fault: one slow-to-rise and one
/// slow-to-fall fault per node output (transition faults are not collapsed
/// onto fanin sites, since launch/capture timing is a property of the line
/// itself, not of a particular fanout edge).
pub fn collapsed_transition_faults(netlist: &Netlist) -> Vec<Fault> {
    let mut faults = Vec::new();
    let mut next_id: FaultId = 0;
    for n in 0..netlist.nb_nodes() as NodeId {
        for kind in [FaultKind::SlowToRise, FaultKind::SlowToFall] {
            faults.push(Fault {
                id: next_id,
                node: n,
                site: FaultSite::Output,
                kind,
            });
            next_id += 1;
        }
    }
    faults
}

/// The far end of the single-fanout buffer/inverter chain starting at `start`:
/// walk forward while the current node's only fanout is a `Buf` gate reading
/// directly from it, stopping at the first node that branches, feeds a
/// different kind of gate, or has no fanout at all.
fn chain_terminal(netlist: &Netlist, start: NodeId) -> NodeId {
    let mut cur = start;
    loop {
        let fanouts = netlist.fanouts(cur);
        if fanouts.len() != 1 {
            break;
        }
        let next = fanouts[0];
        match netlist.network().gate(next as usize) {
            Gate::Buf(s) if s.is_var() && s.var() == cur => cur = next,
            _ => break,
        }
    }
    cur
}

/// [`collapsed_stuck_at_faults`], further collapsed across inverter/buffer
/// chains: a chain of single-fanout `Buf` gates carries the same fault
/// equivalence class end to end, so only the chain's terminal node needs an
/// output-site fault, with every interior node's output fault dropped as
/// redundant.
pub fn representative_stuck_at_faults(netlist: &Netlist) -> Vec<Fault> {
    let mut next_id: FaultId = 0;
    collapsed_stuck_at_faults(netlist)
        .into_iter()
        .filter(|f| f.site != FaultSite::Output || chain_terminal(netlist, f.node) == f.node)
        .map(|mut f| {
            f.id = next_id;
            next_id += 1;
            f
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    fn small() -> Netlist {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        Netlist::build(net)
    }

    #[test]
    fn test_stuck_at_enum() {
        let nl = small();
        let faults = collapsed_stuck_at_faults(&nl);
        assert_eq!(faults.len(), 2);
        assert!(faults.iter().any(|f| f.kind == FaultKind::StuckAt0));
        assert!(faults.iter().any(|f| f.kind == FaultKind::StuckAt1));
    }

    #[test]
    fn test_excitation_condition() {
        let nl = small();
        let f = Fault {
            id: 0,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        };
        let cond = f.excitation_condition(&nl);
        assert_eq!(cond.len(), 1);
    }

    #[test]
    fn test_representative_faults_collapse_buffer_chain() {
        let mut net = Network::new();
        let inputs = net.add_inputs(1);
        let b0 = net.buf(inputs[0]);
        let b1 = net.buf(b0);
        let b2 = net.buf(b1);
        net.add_output(b2);
        let nl = Netlist::build(net);

        let base = collapsed_stuck_at_faults(&nl);
        let rep = representative_stuck_at_faults(&nl);
        // b0 and b1 each have a single fanout feeding another Buf, so their
        // output faults collapse onto the chain's terminal, b2.
        assert!(rep.len() < base.len());
        let terminal = nl.nb_nodes() as NodeId - 1;
        assert!(rep
            .iter()
            .filter(|f| f.site == FaultSite::Output)
            .all(|f| f.node == terminal));
    }
}
