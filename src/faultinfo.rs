//! Shared, mutex-protected bookkeeping of fault disposition across the
//! per-region DTPG worker threads.

use crate::fault::{Fault, FaultId};
use crate::testvector::TestVector;
use std::sync::Mutex;

/// Final disposition of a fault after DTPG and/or fault simulation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FaultStatus {
    Undetected,
    Detected,
    Untestable,
    /// The SAT solver gave up (timeout/resource limit) before reaching a
    /// verdict.
    Aborted,
    /// Removed from the active set by fault reduction because it is dominated
    /// by another fault still under test.
    Deleted,
}

/// Per-fault record: its current status and, once detected, the vector and
/// originating fault that detects it (the originating fault differs from
/// `fault` when detection was inferred by dominance rather than by direct
/// DTPG).
#[derive(Clone, Debug)]
pub struct FaultInfo {
    pub fault: Fault,
    pub status: FaultStatus,
    pub detecting_pattern: Option<TestVector>,
}

impl FaultInfo {
    fn new(fault: Fault) -> FaultInfo {
        FaultInfo {
            fault,
            status: FaultStatus::Undetected,
            detecting_pattern: None,
        }
    }
}

/// Central, lock-protected table of [`FaultInfo`] indexed by [`FaultId`].
/// Shared by reference across the per-region worker threads; each thread only
/// holds the lock for the duration of a single status update.
pub struct FaultInfoMgr {
    table: Mutex<Vec<FaultInfo>>,
}

impl FaultInfoMgr {
    pub fn new(faults: &[Fault]) -> FaultInfoMgr {
        let mut table: Vec<FaultInfo> = faults.iter().map(|f| FaultInfo::new(*f)).collect();
        table.sort_by_key(|fi| fi.fault.id);
        FaultInfoMgr {
            table: Mutex::new(table),
        }
    }

    pub fn mark_detected(&self, id: FaultId, pattern: TestVector) {
        let mut table = self.table.lock().unwrap();
        let entry = &mut table[id as usize];
        entry.status = FaultStatus::Detected;
        entry.detecting_pattern = Some(pattern);
    }

    pub fn mark_untestable(&self, id: FaultId) {
        let mut table = self.table.lock().unwrap();
        table[id as usize].status = FaultStatus::Untestable;
    }

    pub fn mark_aborted(&self, id: FaultId) {
        let mut table = self.table.lock().unwrap();
        table[id as usize].status = FaultStatus::Aborted;
    }

    pub fn mark_deleted(&self, id: FaultId) {
        let mut table = self.table.lock().unwrap();
        table[id as usize].status = FaultStatus::Deleted;
    }

    pub fn status(&self, id: FaultId) -> FaultStatus {
        self.table.lock().unwrap()[id as usize].status
    }

    pub fn snapshot(&self) -> Vec<FaultInfo> {
        self.table.lock().unwrap().clone()
    }

    /// Faults still requiring attention: undetected and not (yet) proven
    /// untestable or deleted by reduction.
    pub fn remaining(&self) -> Vec<FaultId> {
        self.table
            .lock()
            .unwrap()
            .iter()
            .filter(|fi| fi.status == FaultStatus::Undetected)
            .map(|fi| fi.fault.id)
            .collect()
    }

    /// Summary counters, used for the CLI's coverage report.
    pub fn summary(&self) -> FaultSummary {
        let table = self.table.lock().unwrap();
        let mut s = FaultSummary::default();
        for fi in table.iter() {
            match fi.status {
                FaultStatus::Undetected => s.undetected += 1,
                FaultStatus::Detected => s.detected += 1,
                FaultStatus::Untestable => s.untestable += 1,
                FaultStatus::Aborted => s.aborted += 1,
                FaultStatus::Deleted => s.deleted += 1,
            }
        }
        s.total = table.len();
        s
    }
}

/// Aggregate counts by [`FaultStatus`], plus the derived test coverage ratio.
#[derive(Clone, Copy, Debug, Default)]
pub struct FaultSummary {
    pub total: usize,
    pub detected: usize,
    pub undetected: usize,
    pub untestable: usize,
    pub aborted: usize,
    pub deleted: usize,
}

impl FaultSummary {
    /// Detected / (total - untestable - deleted), the standard test coverage
    /// metric excluding faults proven impossible to excite.
    pub fn coverage(&self) -> f64 {
        let denom = self.total - self.untestable - self.deleted;
        if denom == 0 {
            1.0
        } else {
            self.detected as f64 / denom as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::fault::FaultSite;

    fn dummy_fault(id: FaultId) -> Fault {
        Fault {
            id,
            node: 0,
            site: FaultSite::Output,
            kind: FaultKind::StuckAt0,
        }
    }

    #[test]
    fn test_mark_and_summary() {
        let faults = vec![dummy_fault(0), dummy_fault(1), dummy_fault(2)];
        let mgr = FaultInfoMgr::new(&faults);
        mgr.mark_detected(0, TestVector::new(4));
        mgr.mark_untestable(1);
        let summary = mgr.summary();
        assert_eq!(summary.detected, 1);
        assert_eq!(summary.untestable, 1);
        assert_eq!(summary.undetected, 1);
        assert!((summary.coverage() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_remaining() {
        let faults = vec![dummy_fault(0), dummy_fault(1)];
        let mgr = FaultInfoMgr::new(&faults);
        mgr.mark_detected(0, TestVector::new(1));
        assert_eq!(mgr.remaining(), vec![1]);
    }
}
