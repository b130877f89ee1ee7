//! # Coordinator Module
//!
//! Drives one run from two directory roots to a summary.
//!
//! ## Phases
//! 1. **Scan** - Walk the original tree, then the work tree
//! 2. **Index** - Bucket originals by normalized name
//! 3. **Preload** - With `ignore_name` and `media_magic`, hash every
//!    original image up front on the rayon pool
//! 4. **Match** - Walk the work files in traversal order: look up
//!    candidates, evaluate, decide, report, then dispatch the actions to the
//!    execution mode
//!
//! ## Execution Modes
//! - `DryRun` (default) - report only
//! - `Inspect` - hand the exact command sequence to a `CommandEmitter`
//! - `Execute` - run the commands through a `FilesystemExecutor`
//!
//! Report and command order follow the work tree, whatever the preload did.
//! A run can be cancelled between two work files; the summary then carries
//! the `skip` value that resumes where it stopped.

mod runner;
mod summary;

pub use runner::{RunCoordinator, RunCoordinatorBuilder};
pub use summary::{RunOutcome, RunSummary};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What happens to actionable decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    DryRun,
    Inspect,
    Execute,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::DryRun => write!(f, "dry run"),
            ExecutionMode::Inspect => write!(f, "inspect"),
            ExecutionMode::Execute => write!(f, "execute"),
        }
    }
}

/// Shared flag to stop a run between two work files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
