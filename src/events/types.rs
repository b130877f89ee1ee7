//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory walking events
    Scan(ScanEvent),
    /// Media descriptor preload events
    Descriptor(DescriptorEvent),
    /// Per work file matching events
    Match(MatchEvent),
    /// Run-level events
    Run(RunEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Walking a root has started
    Started { root: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Walking a root completed
    Completed { root: PathBuf, total_files: usize },
}

/// Events while precomputing media descriptors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DescriptorEvent {
    /// Preloading has started
    Started { total: usize },
    /// Progress update during preloading
    Progress(DescriptorProgress),
    /// Preloading completed
    Completed { computed: usize, unavailable: usize },
}

/// Progress information during descriptor preloading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorProgress {
    /// Descriptors computed so far
    pub completed: usize,
    /// Total descriptors requested
    pub total: usize,
    /// File just processed
    pub current_path: PathBuf,
}

/// Events while walking the work files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Matching has started
    Started { total_work_files: usize },
    /// A work file has been processed
    Progress(MatchProgress),
    /// A duplicate (or, when inverted, a unique file) was reported
    Reported {
        work_path: PathBuf,
        affectable: bool,
        warnings: usize,
    },
}

/// Progress information while matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProgress {
    /// Work files processed so far
    pub processed: usize,
    /// Total work files
    pub total: usize,
    /// Affectable pairs so far
    pub affectable: usize,
    /// Cumulative size of affectable files so far
    pub affected_bytes: u64,
    /// Work file just processed
    pub current_path: PathBuf,
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    /// Run has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: RunPhase },
    /// Run completed
    Completed {
        affectable: usize,
        warnings: usize,
        failures: usize,
    },
    /// Run was cancelled between work files
    Cancelled { resume_skip: usize },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Scanning,
    Indexing,
    Preloading,
    Matching,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Scanning => write!(f, "Scanning"),
            RunPhase::Indexing => write!(f, "Indexing originals"),
            RunPhase::Preloading => write!(f, "Caching image hashes"),
            RunPhase::Matching => write!(f, "Matching"),
        }
    }
}
