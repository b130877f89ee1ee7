//! # Index Module
//!
//! Lookup structure over the original tree.
//!
//! With name matching on, originals are bucketed by normalized stem and a
//! lookup is a single map hit. Unrelated originals may share a bucket (same
//! stem, different extension); the evaluator sorts them out. With
//! `ignore_name`, every original is a candidate for every work file.

use crate::core::normalize::Normalizer;
use crate::core::scanner::FileRecord;
use std::collections::HashMap;
use tracing::debug;

/// Originals grouped by comparison key, in traversal order
#[derive(Debug)]
pub struct CandidateIndex {
    originals: Vec<FileRecord>,
    by_key: Option<HashMap<String, Vec<usize>>>,
}

impl CandidateIndex {
    /// Index originals by `normalizer` keys, or not at all when `ignore_name`
    pub fn build(originals: Vec<FileRecord>, normalizer: &Normalizer, ignore_name: bool) -> Self {
        let by_key = if ignore_name {
            None
        } else {
            let mut map: HashMap<String, Vec<usize>> = HashMap::new();
            for (i, record) in originals.iter().enumerate() {
                map.entry(normalizer.original_key(&record.stem)).or_default().push(i);
            }
            debug!("Indexed {} originals under {} keys", originals.len(), map.len());
            Some(map)
        };

        Self { originals, by_key }
    }

    /// Candidates for a normalized key, in traversal order
    pub fn lookup(&self, key: &str) -> Vec<&FileRecord> {
        match &self.by_key {
            None => self.originals.iter().collect(),
            Some(map) => map
                .get(key)
                .map(|ids| ids.iter().map(|&i| &self.originals[i]).collect())
                .unwrap_or_default(),
        }
    }

    /// Whether every original is a candidate
    pub fn is_full_scan(&self) -> bool {
        self.by_key.is_none()
    }

    pub fn originals(&self) -> &[FileRecord] {
        &self.originals
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}
