//! Common scaffolding shared by the fault-propagation encoders built on top
//! of a [`StructEngine`]: the list of nodes each encoder needs literals for,
//! split by time frame.

use crate::network::NodeId;

/// The nodes a sub-encoder needs a literal for, split between "current frame"
/// (the capture frame of a two-frame query, or the only frame of a
/// combinational one) and "previous frame" (the launch frame, only used by
/// transition-delay encoders).
#[derive(Clone, Debug, Default)]
pub struct Scope {
    cur_nodes: Vec<NodeId>,
    prev_nodes: Vec<NodeId>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    pub fn add_cur(&mut self, node: NodeId) {
        if !self.cur_nodes.contains(&node) {
            self.cur_nodes.push(node);
        }
    }

    pub fn add_prev(&mut self, node: NodeId) {
        if !self.prev_nodes.contains(&node) {
            self.prev_nodes.push(node);
        }
    }

    pub fn node_list(&self) -> &[NodeId] {
        &self.cur_nodes
    }

    pub fn prev_node_list(&self) -> &[NodeId] {
        &self.prev_nodes
    }
}

/// Shared behavior for the encoders layered on top of [`StructEngine`]
/// (`BoolDiffEnc`, `FFREnc`, `MFFCEnc`, `FaultEnc`): each owns a [`Scope`]
/// describing what it touches, used by the DTPG driver to decide how much of
/// the structural CNF a query will pull in before it runs.
pub trait SubEnc {
    fn scope(&self) -> &Scope;
}
