//! Fault propagation scoped to a single fanout-free region: the encoder
//! [`crate::reduce::dom_check::FfrDomChecker`] builds to test FFR-local
//! dominance between two faults sharing the same FFR root.

use super::bool_diff::BoolDiffEnc;
use crate::engine::{Scope, StructEngine, SubEnc, TimeFrame};
use crate::fault::Fault;
use crate::network::{FfrId, NodeId};
use fxhash::FxHashSet;
use rustsat::types::Lit;

/// Boolean-difference propagation restricted to one FFR: `prop_var` is
/// asserted when the fault's effect reaches the FFR's root, without paying
/// for CNF beyond the FFR boundary.
pub struct FfrEnc {
    inner: BoolDiffEnc,
}

impl FfrEnc {
    pub fn new(engine: &mut StructEngine, ffr: FfrId, fault: &Fault, time: TimeFrame) -> FfrEnc {
        let members: FxHashSet<NodeId> = engine.netlist().ffr(ffr).members.iter().copied().collect();
        let inner = BoolDiffEnc::new_restricted(engine, fault, time, Some(&members));
        FfrEnc { inner }
    }

    pub fn prop_var(&self) -> Lit {
        self.inner.prop_var()
    }

    pub fn dvar(&self, node: NodeId) -> Option<Lit> {
        self.inner.dvar(node)
    }
}

impl SubEnc for FfrEnc {
    fn scope(&self) -> &Scope {
        self.inner.scope()
    }
}
