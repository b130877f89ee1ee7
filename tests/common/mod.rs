//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use duplicate_file_matcher::core::hasher::ImageHashValue;
use duplicate_file_matcher::core::media::MediaBackend;
use duplicate_file_matcher::core::scanner::system_time_to_secs;
use duplicate_file_matcher::error::DescriptorError;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// Reference modification time
pub const T: i64 = 1_700_000_000;
pub const HOUR: i64 = 3600;
pub const DAY: i64 = 24 * HOUR;

/// Write `content` to `dir/name` and set its modification time
pub fn write_file(dir: &Path, name: &str, content: &str, mtime: i64) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    set_mtime(&path, mtime);
    path
}

pub fn set_mtime(path: &Path, mtime: i64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(mtime as u64))
        .unwrap();
}

pub fn mtime(path: &Path) -> i64 {
    system_time_to_secs(fs::metadata(path).unwrap().modified().unwrap())
}

/// Deterministic content whose length grows with `seed`
pub fn text(seed: usize) -> String {
    "abcdefghij".repeat(1 + seed)
}

/// Work and original trees used by the date tolerance tests.
///
/// Every original `file_0..file_11` has content seed 1 and mtime `T`.
/// Work files differ in content (`file_1`, `file_2`) or in modification
/// time by the given offset.
pub struct DateFixture {
    pub root: tempfile::TempDir,
    pub work_dir: PathBuf,
    pub original_dir: PathBuf,
}

pub const WORK_FILES: [(&str, i64, usize); 10] = [
    ("file_1", 0, 2),
    ("file_2", 0, 3),
    ("file_4", HOUR, 1),
    ("file_5", 2 * HOUR, 1),
    ("file_6", HOUR + 1, 1),
    ("file_7", HOUR - 1, 1),
    ("file_8", -HOUR, 1),
    ("file_9", -10, 1),
    ("file_10", -365 * DAY, 1),
    ("file_11", 0, 1),
];

impl DateFixture {
    pub fn new() -> Self {
        let root = tempfile::TempDir::new().unwrap();
        let work_dir = root.path().join("work_dir");
        let original_dir = root.path().join("originals");
        fs::create_dir_all(&work_dir).unwrap();
        fs::create_dir_all(&original_dir).unwrap();

        for i in 0..12 {
            write_file(&original_dir, &format!("file_{}", i), &text(1), T);
        }
        for (name, offset, seed) in WORK_FILES {
            write_file(&work_dir, name, &text(seed), T + offset);
        }

        Self {
            root,
            work_dir,
            original_dir,
        }
    }

    pub fn work(&self, i: usize) -> PathBuf {
        self.work_dir.join(format!("file_{}", i))
    }

    pub fn original(&self, i: usize) -> PathBuf {
        self.original_dir.join(format!("file_{}", i))
    }

    /// Indices of work files now carrying the rename marker
    pub fn prefixed(&self) -> Vec<usize> {
        let mut found: Vec<usize> = fs::read_dir(&self.work_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|n| n.strip_prefix("✓file_"))
                    .and_then(|i| i.parse().ok())
            })
            .collect();
        found.sort_unstable();
        found
    }
}

/// Media backend answering from a fixed table of file names
#[derive(Default)]
pub struct StubBackend {
    hashes: HashMap<String, u64>,
    frames: HashMap<String, u64>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(mut self, name: &str, hash: u64) -> Self {
        self.hashes.insert(name.to_string(), hash);
        self
    }

    pub fn video(mut self, name: &str, frames: u64) -> Self {
        self.frames.insert(name.to_string(), frames);
        self
    }

    fn name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl MediaBackend for StubBackend {
    fn image_hash(&self, path: &Path) -> Result<ImageHashValue, DescriptorError> {
        self.hashes
            .get(&Self::name(path))
            .map(|&h| ImageHashValue::new(h))
            .ok_or_else(|| DescriptorError::Decode {
                path: path.to_path_buf(),
                reason: "not in stub table".to_string(),
            })
    }

    fn frame_count(&self, path: &Path) -> Result<u64, DescriptorError> {
        self.frames
            .get(&Self::name(path))
            .copied()
            .ok_or_else(|| DescriptorError::Probe {
                path: path.to_path_buf(),
                reason: "not in stub table".to_string(),
            })
    }
}
