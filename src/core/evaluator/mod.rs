//! # Evaluator Module
//!
//! Per-axis comparison of a work file with one candidate original.
//!
//! ## Modes
//! - **Plain**: same suffix, normalized name (unless `ignore_name`), equal
//!   size (unless `ignore_size`), modification time within the tolerance
//!   window (unless `ignore_date`), optional checksum on equal sizes
//! - **Media** (`media_magic` and the work file is an image or a video):
//!   same media class, normalized name ignoring the extension (unless
//!   `ignore_name`), perceptual descriptor within tolerance. Size and date
//!   never decide the match, the optional capture-date gate aside.
//!
//! Axes are checked cheapest first and evaluation stops at the first
//! failure, so descriptors and checksums are only computed for pairs that
//! still stand a chance.

mod outcome;

pub use outcome::{Axis, ChecksumCheck, ComparisonOutcome, EvaluationMode, MediaDelta, NameCheck};

use crate::core::cache::DescriptorCache;
use crate::core::config::MatchConfig;
use crate::core::media::MediaDescriptor;
use crate::core::normalize::Normalizer;
use crate::core::scanner::{FileRecord, MediaKind};
use tracing::debug;

/// Capture-date gate window of `img_compare_date`, in seconds
pub const CAPTURE_DATE_WINDOW: i64 = 3600;

/// Compares pairs under one configuration
pub struct PairEvaluator<'a> {
    config: &'a MatchConfig,
    normalizer: &'a Normalizer,
    cache: &'a DescriptorCache,
}

impl<'a> PairEvaluator<'a> {
    pub fn new(
        config: &'a MatchConfig,
        normalizer: &'a Normalizer,
        cache: &'a DescriptorCache,
    ) -> Self {
        Self {
            config,
            normalizer,
            cache,
        }
    }

    /// Which rules apply to a work file
    pub fn mode_for(&self, work: &FileRecord) -> EvaluationMode {
        if self.config.media().media_magic && work.kind().is_media() {
            EvaluationMode::Media
        } else {
            EvaluationMode::Plain
        }
    }

    /// Would `candidate` be compared at all (suffix or media class)?
    pub fn is_comparable(&self, work: &FileRecord, candidate: &FileRecord) -> bool {
        match self.mode_for(work) {
            EvaluationMode::Media => work.kind() == candidate.kind(),
            EvaluationMode::Plain => self.normalizer.same_suffix(&work.suffix, &candidate.suffix),
        }
    }

    pub fn evaluate(&self, work: &FileRecord, candidate: &FileRecord) -> ComparisonOutcome {
        let mode = self.mode_for(work);
        let mut outcome = ComparisonOutcome::new(mode, work, candidate, self.name_check(work, candidate));

        match mode {
            EvaluationMode::Plain => self.evaluate_plain(work, candidate, &mut outcome),
            EvaluationMode::Media => self.evaluate_media(work, candidate, &mut outcome),
        }

        debug!(
            "{} vs {}: {}",
            work.path.display(),
            candidate.path.display(),
            outcome.summary()
        );
        outcome
    }

    fn name_check(&self, work: &FileRecord, candidate: &FileRecord) -> NameCheck {
        if self.config.name().ignore_name {
            return NameCheck::ignored();
        }
        let work_key = self.normalizer.key(&work.stem);
        let matched = work_key == self.normalizer.original_key(&candidate.stem);
        NameCheck {
            active: true,
            matched,
            key: work_key,
        }
    }

    fn evaluate_plain(&self, work: &FileRecord, candidate: &FileRecord, outcome: &mut ComparisonOutcome) {
        if !self.normalizer.same_suffix(&work.suffix, &candidate.suffix) {
            return outcome.fail(Axis::Suffix);
        }
        if outcome.name.active && !outcome.name.matched {
            return outcome.fail(Axis::Name);
        }

        if !self.config.content().ignore_size {
            outcome.size_checked = true;
            if work.size != candidate.size {
                return outcome.fail(Axis::Size);
            }
        }

        let date = self.config.date();
        if !date.ignore_date {
            outcome.date_checked = true;
            if !date.tolerate_hour.accepts(outcome.date_delta) {
                return outcome.fail(Axis::Date);
            }
        }

        // sizes are confirmed equal at this point
        if self.config.content().checksum {
            outcome.checksum = match (self.cache.checksum(work), self.cache.checksum(candidate)) {
                (Some(a), Some(b)) if a == b => ChecksumCheck::Equal,
                (Some(_), Some(_)) => ChecksumCheck::Differ,
                _ => ChecksumCheck::Unavailable,
            };
            if outcome.checksum != ChecksumCheck::Equal {
                outcome.fail(Axis::Checksum);
            }
        }
    }

    fn evaluate_media(&self, work: &FileRecord, candidate: &FileRecord, outcome: &mut ComparisonOutcome) {
        let kind = work.kind();
        if candidate.kind() != kind {
            outcome.media = MediaDelta::KindMismatch;
            return outcome.fail(Axis::MediaKind);
        }
        if outcome.name.active && !outcome.name.matched {
            return outcome.fail(Axis::Name);
        }

        if kind == MediaKind::Image && self.config.media().img_compare_date {
            let passed = taken_close(work, candidate);
            outcome.capture_gate = Some(passed);
            if !passed {
                return outcome.fail(Axis::CaptureDate);
            }
        }

        let media = self.config.media();
        let (delta, within) = match (self.cache.descriptor(work), self.cache.descriptor(candidate)) {
            (MediaDescriptor::ImageHash(a), MediaDescriptor::ImageHash(b)) => {
                let distance = a.distance(&b);
                (MediaDelta::HashDistance(distance), distance <= media.accepted_img_hash_diff)
            }
            (MediaDescriptor::VideoFrameCount(a), MediaDescriptor::VideoFrameCount(b)) => {
                let delta = a.abs_diff(b);
                (MediaDelta::FrameDelta(delta), delta <= media.accepted_frame_delta)
            }
            _ => (MediaDelta::Unavailable, false),
        };

        outcome.media = delta;
        if !within {
            outcome.fail(Axis::Descriptor);
        }
    }
}

/// Work modification time close to the candidate's modification or capture
/// time, or both capture times close to each other.
fn taken_close(work: &FileRecord, candidate: &FileRecord) -> bool {
    let close = |a: i64, b: i64| (a - b).abs() <= CAPTURE_DATE_WINDOW;

    close(work.modified, candidate.modified)
        || candidate.exif_time.is_some_and(|t| close(work.modified, t))
        || matches!((work.exif_time, candidate.exif_time), (Some(a), Some(b)) if close(a, b))
}
