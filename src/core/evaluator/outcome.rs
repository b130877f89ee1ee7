//! Structured result of comparing one pair.

use crate::core::scanner::FileRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rule set compared the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationMode {
    Plain,
    Media,
}

/// A comparison axis that can reject a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Suffix,
    Name,
    Size,
    Date,
    Checksum,
    MediaKind,
    CaptureDate,
    Descriptor,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Axis::Suffix => "suffix",
            Axis::Name => "name",
            Axis::Size => "size",
            Axis::Date => "date",
            Axis::Checksum => "checksum",
            Axis::MediaKind => "media kind",
            Axis::CaptureDate => "capture date",
            Axis::Descriptor => "media descriptor",
        };
        f.write_str(label)
    }
}

/// Name axis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCheck {
    /// False under `ignore_name`
    pub active: bool,
    pub matched: bool,
    /// Normalized key of the work file
    pub key: String,
}

impl NameCheck {
    pub fn ignored() -> Self {
        Self {
            active: false,
            matched: true,
            key: String::new(),
        }
    }
}

/// Perceptual descriptor comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaDelta {
    NotCompared,
    HashDistance(u32),
    FrameDelta(u64),
    /// One of the descriptors could not be computed
    Unavailable,
    /// Image against video
    KindMismatch,
}

/// Optional content digest comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumCheck {
    NotComputed,
    Equal,
    Differ,
    /// A file could not be read
    Unavailable,
}

/// Per-axis outcome of one work/candidate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub mode: EvaluationMode,
    pub name: NameCheck,
    /// Work size minus candidate size, in bytes
    pub size_delta: i64,
    /// Whether size took part in the match
    pub size_checked: bool,
    /// Work mtime minus candidate mtime, in seconds
    pub date_delta: i64,
    /// Whether the modification time took part in the match
    pub date_checked: bool,
    pub media: MediaDelta,
    /// Result of the `img_compare_date` gate when applied
    pub capture_gate: Option<bool>,
    pub checksum: ChecksumCheck,
    failed: Option<Axis>,
}

impl ComparisonOutcome {
    pub(super) fn new(
        mode: EvaluationMode,
        work: &FileRecord,
        candidate: &FileRecord,
        name: NameCheck,
    ) -> Self {
        Self {
            mode,
            name,
            size_delta: work.size as i64 - candidate.size as i64,
            size_checked: false,
            date_delta: work.modified - candidate.modified,
            date_checked: false,
            media: MediaDelta::NotCompared,
            capture_gate: None,
            checksum: ChecksumCheck::NotComputed,
            failed: None,
        }
    }

    pub(super) fn fail(&mut self, axis: Axis) {
        self.failed.get_or_insert(axis);
    }

    /// All active axes passed
    pub fn is_match(&self) -> bool {
        self.failed.is_none()
    }

    /// First axis that rejected the pair
    pub fn failed_axis(&self) -> Option<Axis> {
        self.failed
    }

    /// Short human-readable description of what was compared
    pub fn summary(&self) -> String {
        if let Some(axis) = self.failed {
            return format!("differs by {}", axis);
        }

        let mut parts = Vec::new();
        if self.name.active {
            parts.push("name".to_string());
        }
        match self.mode {
            EvaluationMode::Plain => {
                if self.size_checked {
                    parts.push("size".to_string());
                }
                if self.date_checked {
                    match self.date_delta {
                        0 => parts.push("date".to_string()),
                        delta => parts.push(format!("date ({:+}s)", delta)),
                    }
                }
                if self.checksum == ChecksumCheck::Equal {
                    parts.push("checksum".to_string());
                }
            }
            EvaluationMode::Media => {
                if self.capture_gate == Some(true) {
                    parts.push("capture date".to_string());
                }
                match self.media {
                    MediaDelta::HashDistance(d) => parts.push(format!("image hash distance {}", d)),
                    MediaDelta::FrameDelta(d) => parts.push(format!("frame count delta {}", d)),
                    _ => {}
                }
            }
        }

        if parts.is_empty() {
            "matched".to_string()
        } else {
            format!("same {}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_is_kept() {
        let work = FileRecord::new("/w/a.txt", 1, 0);
        let mut outcome = ComparisonOutcome::new(EvaluationMode::Plain, &work, &work, NameCheck::ignored());

        outcome.fail(Axis::Size);
        outcome.fail(Axis::Date);

        assert_eq!(outcome.failed_axis(), Some(Axis::Size));
        assert_eq!(outcome.summary(), "differs by size");
    }

    #[test]
    fn summary_lists_checked_axes() {
        let work = FileRecord::new("/w/a.txt", 1, 30);
        let original = FileRecord::new("/o/a.txt", 1, 0);
        let mut outcome = ComparisonOutcome::new(
            EvaluationMode::Plain,
            &work,
            &original,
            NameCheck {
                active: true,
                matched: true,
                key: "a".to_string(),
            },
        );
        outcome.size_checked = true;
        outcome.date_checked = true;

        assert_eq!(outcome.summary(), "same name, size, date (+30s)");
    }
}
