//! # Scanner Module
//!
//! Walks the work and original trees into immutable `FileRecord` snapshots.
//!
//! ## Guarantees
//! - Traversal order is deterministic (entries sorted by file name), so
//!   reports and emitted commands are reproducible on an unchanged tree
//! - Symlinks are never followed nor reported
//! - A file whose metadata cannot be read becomes a per-file error; only a
//!   missing or unreadable root aborts the scan
//!
//! ## Media classes
//! - Images: jpg, jpeg, png, gif, avif, webp, heic
//! - Videos: mp4, mov, avi, vob, mts, 3gp, mpg, mpeg, wmv, hevc
//!
//! ## Example
//! ```rust,ignore
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/photos/work"))?;
//! ```

mod filter;
mod walker;

pub use filter::SuffixFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::media::MediaDescriptor;
use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const IMAGE_SUFFIXES: &[&str] = &["jpg", "jpeg", "png", "gif", "avif", "webp", "heic"];
pub const VIDEO_SUFFIXES: &[&str] = &[
    "mp4", "mov", "avi", "vob", "mts", "3gp", "mpg", "mpeg", "wmv", "hevc",
];

/// Media class derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify an extension (without the dot, any case)
    pub fn from_suffix(suffix: &str) -> Self {
        let lower = suffix.to_lowercase();
        if IMAGE_SUFFIXES.contains(&lower.as_str()) {
            MediaKind::Image
        } else if VIDEO_SUFFIXES.contains(&lower.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    pub fn is_media(&self) -> bool {
        !matches!(self, MediaKind::Other)
    }
}

/// Immutable snapshot of one file, taken at scan time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path
    pub path: PathBuf,
    /// File name without the last extension
    pub stem: String,
    /// Last extension without the dot, as written ("" when none)
    pub suffix: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time in whole seconds since the Unix epoch
    pub modified: i64,
    /// EXIF capture time in seconds since the Unix epoch
    pub exif_time: Option<i64>,
    /// Precomputed content digest
    pub checksum: Option<u64>,
    /// Precomputed perceptual descriptor
    pub descriptor: Option<MediaDescriptor>,
}

impl FileRecord {
    /// Build a record from already known metadata (no filesystem access)
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: i64) -> Self {
        let path = path.into();
        let (stem, suffix) = split_name(&path);
        Self {
            path,
            stem,
            suffix,
            size,
            modified,
            exif_time: None,
            checksum: None,
            descriptor: None,
        }
    }

    /// Stat a file on disk. Symlinks are not followed.
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let metadata = std::fs::symlink_metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ScanError::Vanished {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ScanError::ReadDirectory {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let modified = metadata
            .modified()
            .map(system_time_to_secs)
            .unwrap_or_default();

        Ok(Self::new(path, metadata.len(), modified))
    }

    pub fn with_exif_time(mut self, exif_time: Option<i64>) -> Self {
        self.exif_time = exif_time;
        self
    }

    pub fn with_checksum(mut self, checksum: u64) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn with_descriptor(mut self, descriptor: MediaDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Full file name ("stem.suffix")
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_suffix(&self.suffix)
    }

    /// Capture time when known, modification time otherwise
    pub fn capture_time(&self) -> i64 {
        self.exif_time.unwrap_or(self.modified)
    }
}

fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (stem, suffix)
}

/// Whole seconds since the epoch; sub-second precision is dropped.
pub fn system_time_to_secs(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}

/// Result of walking one root
#[derive(Debug)]
pub struct ScanResult {
    /// Records in traversal order
    pub files: Vec<FileRecord>,
    /// Per-file failures (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for directory walkers
///
/// Implement this trait to feed the engine from another source (e.g. tests).
pub trait FileScanner: Send + Sync {
    /// Walk a root and return its files in a stable order
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Walk with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender)
        -> Result<ScanResult, ScanError>;
}
