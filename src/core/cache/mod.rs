//! # Cache Module
//!
//! Run-scoped memo of expensive per-file signatures.
//!
//! ## Entries
//! - Media descriptors (image hash, video frame count) keyed by path
//! - Content checksums keyed by path
//!
//! ## Lifetime
//! A cache is created for one run and dropped with it. Entries are never
//! invalidated: a file changed mid-run keeps its first descriptor. Nothing
//! is persisted between runs.
//!
//! ## Concurrency
//! Lookups take a read lock; computation happens outside any lock and the
//! first writer wins, so two workers racing on one path at worst compute
//! the same value twice.

mod preload;

pub use preload::PreloadStats;

use crate::core::checksum;
use crate::core::media::{MediaBackend, MediaDescriptor};
use crate::core::scanner::FileRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Memo table of media descriptors and checksums for one run
pub struct DescriptorCache {
    backend: Arc<dyn MediaBackend>,
    descriptors: RwLock<HashMap<PathBuf, MediaDescriptor>>,
    checksums: RwLock<HashMap<PathBuf, Option<u64>>>,
}

impl DescriptorCache {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            backend,
            descriptors: RwLock::new(HashMap::new()),
            checksums: RwLock::new(HashMap::new()),
        }
    }

    /// Descriptor of a file, computed on first request.
    ///
    /// A descriptor already carried by the record is used as is.
    pub fn descriptor(&self, record: &FileRecord) -> MediaDescriptor {
        if let Some(descriptor) = record.descriptor {
            return descriptor;
        }
        if let Some(descriptor) = read(&self.descriptors, &record.path) {
            return descriptor;
        }

        let computed = self.backend.describe(&record.path, record.kind());
        debug!("Descriptor of {}: {:?}", record.path.display(), computed);
        insert_first(&self.descriptors, record.path.clone(), computed)
    }

    /// Content digest of a file, computed on first request.
    ///
    /// `None` when the file cannot be read.
    pub fn checksum(&self, record: &FileRecord) -> Option<u64> {
        if record.checksum.is_some() {
            return record.checksum;
        }
        if let Some(checksum) = read(&self.checksums, &record.path) {
            return checksum;
        }

        let computed = checksum::file_checksum(&record.path)
            .map_err(|e| warn!("{}", e))
            .ok();
        insert_first(&self.checksums, record.path.clone(), computed)
    }

    pub fn contains(&self, path: &Path) -> bool {
        read(&self.descriptors, path).is_some()
    }

    /// Number of memoized descriptors
    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every entry
    pub fn clear(&self) {
        self.descriptors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        self.checksums
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

// A poisoned lock only means another worker panicked; the map itself is intact.
fn read<V: Copy>(map: &RwLock<HashMap<PathBuf, V>>, key: &Path) -> Option<V> {
    map.read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(key)
        .copied()
}

fn insert_first<V: Copy>(map: &RwLock<HashMap<PathBuf, V>>, key: PathBuf, value: V) -> V {
    *map.write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .entry(key)
        .or_insert(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::ImageHashValue;
    use crate::error::DescriptorError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl MediaBackend for CountingBackend {
        fn image_hash(&self, _path: &Path) -> Result<ImageHashValue, DescriptorError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ImageHashValue::new(n as u64))
        }

        fn frame_count(&self, path: &Path) -> Result<u64, DescriptorError> {
            Err(DescriptorError::Probe {
                path: path.to_path_buf(),
                reason: "stub".to_string(),
            })
        }
    }

    fn cache() -> (Arc<CountingBackend>, DescriptorCache) {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let cache = DescriptorCache::new(backend.clone());
        (backend, cache)
    }

    #[test]
    fn descriptor_is_computed_once() {
        let (backend, cache) = cache();
        let record = FileRecord::new("/photos/a.jpg", 10, 0);

        let first = cache.descriptor(&record);
        let second = cache.descriptor(&record);

        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains(Path::new("/photos/a.jpg")));
    }

    #[test]
    fn precomputed_descriptor_skips_backend() {
        let (backend, cache) = cache();
        let record = FileRecord::new("/photos/a.jpg", 10, 0)
            .with_descriptor(MediaDescriptor::VideoFrameCount(5));

        assert_eq!(cache.descriptor(&record), MediaDescriptor::VideoFrameCount(5));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failures_are_memoized_as_unavailable() {
        let (_, cache) = cache();
        let record = FileRecord::new("/videos/a.mp4", 10, 0);

        assert_eq!(cache.descriptor(&record), MediaDescriptor::Unavailable);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forgets_entries() {
        let (backend, cache) = cache();
        let record = FileRecord::new("/photos/a.jpg", 10, 0);

        cache.descriptor(&record);
        cache.clear();
        assert!(cache.is_empty());

        cache.descriptor(&record);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn checksum_of_missing_file_is_none() {
        let (_, cache) = cache();
        let record = FileRecord::new("/nonexistent/a.bin", 10, 0);
        assert_eq!(cache.checksum(&record), None);
    }

    #[test]
    fn checksum_is_memoized_despite_file_change() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"first").unwrap();
        let (_, cache) = cache();
        let record = FileRecord::from_path(&path).unwrap();

        let before = cache.checksum(&record);
        std::fs::write(&path, b"other").unwrap();

        assert!(before.is_some());
        assert_eq!(cache.checksum(&record), before);
    }
}
