//! # Core Module
//!
//! The front-end agnostic matching and decision engine.
//!
//! ## Modules
//! - `config` - Raw toggles and the validated `MatchConfig`
//! - `scanner` - Walks a directory tree into `FileRecord`s
//! - `metadata` - EXIF capture time
//! - `normalize` - File name comparison keys
//! - `index` - Originals bucketed by comparison key
//! - `hasher` - Image decoding and perceptual hashing
//! - `checksum` - Fast content digest
//! - `media` - Media descriptors and the backend producing them
//! - `cache` - Run-scoped descriptor and checksum memo
//! - `evaluator` - Per-axis comparison of one pair
//! - `decision` - Affected side, warnings and actions of one pair
//! - `reporter` - Structured decision records
//! - `ops` - Filesystem commands, their emitters and executors
//! - `coordinator` - Orchestrates a whole run

pub mod cache;
pub mod checksum;
pub mod config;
pub mod coordinator;
pub mod decision;
pub mod evaluator;
pub mod hasher;
pub mod index;
pub mod media;
pub mod metadata;
pub mod normalize;
pub mod ops;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use config::{DestructiveAction, HourTolerance, MatchConfig, MatchSettings};
pub use coordinator::{CancellationToken, ExecutionMode, RunCoordinator, RunOutcome, RunSummary};
pub use decision::{Action, Decision, Warning};
pub use reporter::{DecisionRecord, ReportSink};
pub use scanner::FileRecord;
