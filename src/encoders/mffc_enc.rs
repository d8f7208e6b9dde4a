//! Fault propagation scoped to a maximal fanout-free cone: the same idea as
//! [`super::ffr_enc::FfrEnc`] but spanning every FFR whose fanout stays
//! entirely inside the cone, giving a larger local-dominance test.

use super::bool_diff::BoolDiffEnc;
use crate::engine::{Scope, StructEngine, SubEnc, TimeFrame};
use crate::fault::Fault;
use crate::network::{MffcId, NodeId};
use fxhash::FxHashSet;
use rustsat::types::Lit;

pub struct MffcEnc {
    inner: BoolDiffEnc,
}

impl MffcEnc {
    pub fn new(engine: &mut StructEngine, mffc: MffcId, fault: &Fault, time: TimeFrame) -> MffcEnc {
        let m = engine.netlist().mffc(mffc).ffrs.clone();
        let mut members: FxHashSet<NodeId> = FxHashSet::default();
        for ffr in m {
            members.extend(engine.netlist().ffr(ffr).members.iter().copied());
        }
        let inner = BoolDiffEnc::new_restricted(engine, fault, time, Some(&members));
        MffcEnc { inner }
    }

    pub fn prop_var(&self) -> Lit {
        self.inner.prop_var()
    }

    pub fn dvar(&self, node: NodeId) -> Option<Lit> {
        self.inner.dvar(node)
    }
}

impl SubEnc for MffcEnc {
    fn scope(&self) -> &Scope {
        self.inner.scope()
    }
}
