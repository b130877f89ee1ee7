//! Parallel descriptor precomputation on the rayon pool.

use super::DescriptorCache;
use crate::core::media::MediaDescriptor;
use crate::core::scanner::{FileRecord, MediaKind};
use crate::events::{DescriptorEvent, DescriptorProgress, Event, EventSender};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Outcome of a preload pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadStats {
    /// Descriptors computed (or found) with a usable value
    pub computed: usize,
    /// Files whose descriptor could not be computed
    pub unavailable: usize,
}

impl DescriptorCache {
    /// Compute the descriptors of every record of `kind` in parallel.
    ///
    /// Matching order is unaffected: results only land in the memo table.
    pub fn preload(
        &self,
        records: &[FileRecord],
        kind: MediaKind,
        events: &EventSender,
    ) -> PreloadStats {
        let targets: Vec<&FileRecord> = records.iter().filter(|r| r.kind() == kind).collect();
        let total = targets.len();
        if total == 0 {
            return PreloadStats::default();
        }

        info!("Precomputing {} {:?} descriptors", total, kind);
        events.send(Event::Descriptor(DescriptorEvent::Started { total }));

        let completed = AtomicUsize::new(0);
        let unavailable = AtomicUsize::new(0);

        targets.par_iter().for_each(|record| {
            if self.descriptor(record) == MediaDescriptor::Unavailable {
                unavailable.fetch_add(1, Ordering::SeqCst);
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Descriptor(DescriptorEvent::Progress(
                DescriptorProgress {
                    completed: done,
                    total,
                    current_path: record.path.clone(),
                },
            )));
        });

        let unavailable = unavailable.load(Ordering::SeqCst);
        let stats = PreloadStats {
            computed: total - unavailable,
            unavailable,
        };
        events.send(Event::Descriptor(DescriptorEvent::Completed {
            computed: stats.computed,
            unavailable: stats.unavailable,
        }));

        stats
    }
}
