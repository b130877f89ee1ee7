//! # Error Module
//!
//! User-friendly error types for the duplicate matcher.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, option names, what went wrong
//! - **Only configuration and inaccessible roots are fatal** - everything
//!   else is recorded per file and the run continues

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Media descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Invalid option combinations, raised before any directory is scanned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Choose only one of rename, delete and replace_with_original (got {first} and {second})")]
    ConflictingActions {
        first: &'static str,
        second: &'static str,
    },

    #[error("Checksum cannot be computed when ignore_size is set")]
    ChecksumWithoutSize,

    #[error("You cannot ignore name, date and size at the same time")]
    EverythingIgnored,

    #[error("invert_selection cannot be combined with {option}: the work file has no counterpart")]
    InvertWithCounterpartAction { option: &'static str },

    #[error("Invalid tolerate_hour window {low}..{high}: the lower bound exceeds the upper one")]
    InvalidHourWindow { low: i64, high: i64 },

    #[error("Invalid strip_suffix pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to read settings file {path}: {reason}")]
    ReadSettings { path: PathBuf, reason: String },
}

/// Errors that occur while walking the work or original tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File vanished or became unreadable during the run: {path}")]
    Vanished { path: PathBuf },

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors computing a perceptual descriptor or a content digest.
///
/// These never abort a run; they are folded into `Unavailable`.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Media probe failed for {path}: {reason}. Is ffprobe installed?")]
    Probe { path: PathBuf, reason: String },

    #[error("No descriptor available for this kind of file: {path}")]
    UnsupportedKind { path: PathBuf },
}

/// A filesystem mutation that failed in Execute mode
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Refusing to overwrite {target}: it already exists")]
    TargetExists { target: PathBuf },

    #[error("Failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_actions_names_both_options() {
        let error = ConfigError::ConflictingActions {
            first: "rename",
            second: "delete",
        };
        let message = error.to_string();
        assert!(message.contains("rename"));
        assert!(message.contains("delete"));
    }

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        assert!(error.to_string().contains("/photos/vacation"));
    }

    #[test]
    fn probe_error_suggests_recovery() {
        let error = DescriptorError::Probe {
            path: PathBuf::from("/videos/clip.mp4"),
            reason: "exit status 1".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/videos/clip.mp4"));
        assert!(message.contains("ffprobe"));
    }

    #[test]
    fn config_error_converts_into_top_level() {
        let error: DedupError = ConfigError::ChecksumWithoutSize.into();
        assert!(matches!(error, DedupError::Config(_)));
        assert!(error.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn target_exists_mentions_target() {
        let error = ExecutionError::TargetExists {
            target: PathBuf::from("/work/✓a.jpg"),
        };
        assert!(error.to_string().contains("✓a.jpg"));
    }
}
