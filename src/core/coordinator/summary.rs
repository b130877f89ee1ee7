//! Run totals.

use crate::core::ops::FsCommand;
use crate::core::reporter::DecisionRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate counters of one run, final once the run returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Correlates log lines of one run
    pub run_id: Uuid,
    pub originals_scanned: usize,
    pub work_files_scanned: usize,
    /// Reported pairs whose actions are not suppressed by warnings
    pub affectable_count: usize,
    /// Cumulative size of affectable files, in bytes
    pub affected_size: u64,
    /// Reported pairs with at least one warning
    pub warnings_count: usize,
    /// Commands that failed in Execute mode
    pub failures: usize,
    /// Work files already carrying the rename marker
    pub ignored: usize,
    /// Work files that vanished, or whose descriptor or checksum was unreadable
    pub unavailable: usize,
    /// Work files with several candidates and no match
    pub unresolved_multi_candidate: usize,
    /// Per-file errors while walking either tree
    pub scan_errors: usize,
    /// `skip` value that resumes a cancelled run
    pub cancelled: Option<usize>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub(super) fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            originals_scanned: 0,
            work_files_scanned: 0,
            affectable_count: 0,
            affected_size: 0,
            warnings_count: 0,
            failures: 0,
            ignored: 0,
            unavailable: 0,
            unresolved_multi_candidate: 0,
            scan_errors: 0,
            cancelled: None,
            duration_ms: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }
}

/// Everything a run produced, for callers that do not stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// Reported decisions in work-tree order
    pub records: Vec<DecisionRecord>,
    /// Commands handed to the emitter (Inspect mode only)
    pub commands: Vec<FsCommand>,
}
