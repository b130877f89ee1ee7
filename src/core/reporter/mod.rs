//! # Reporter Module
//!
//! Structured per-decision records and the sinks that receive them.
//!
//! The engine never formats console text itself. Every reported pair
//! becomes a `DecisionRecord`: which files, what was concluded, which
//! warnings were raised, which actions were (or would be) taken, and a
//! rationale sentence. Front-ends render records however they like.
//!
//! Only duplicates (and, with `invert_selection`, unique files) are
//! reported; non-matching pairs are logged at debug level.

mod render;

pub use render::{display_path, format_bytes, SideNotes};

use crate::core::decision::{Action, Decision, Side, Warning};
use crate::error::ExecutionError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// What a record says about the work file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Matched; actions are eligible
    Duplicate,
    /// Matched, but warnings suppressed the destructive action
    SkippedOnWarning,
    /// No counterpart found (`invert_selection`)
    Unique,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Duplicate => write!(f, "duplicate"),
            Classification::SkippedOnWarning => write!(f, "skipped on warning"),
            Classification::Unique => write!(f, "unique"),
        }
    }
}

/// One reported decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub work_path: PathBuf,
    /// Counterpart(s); empty for unique files
    pub original_paths: Vec<PathBuf>,
    pub classification: Classification,
    /// Which file the actions target
    pub affected: Option<Side>,
    pub warnings: Vec<Warning>,
    pub actions: Vec<Action>,
    pub rationale: String,
    /// Execution failures, in Execute mode only
    pub failures: Vec<String>,
}

impl DecisionRecord {
    /// Record for a reportable decision; `None` for non-matches
    pub fn from_decision(work_path: &Path, decision: &Decision) -> Option<Self> {
        match decision {
            Decision::NoMatch(_) => None,
            Decision::Duplicate(d) => {
                let original = match d.affected {
                    Side::Work => d.counterpart_path.clone(),
                    Side::Original => d.affected_path.clone(),
                };
                Some(Self {
                    work_path: work_path.to_path_buf(),
                    original_paths: vec![original],
                    classification: if d.suppressed {
                        Classification::SkippedOnWarning
                    } else {
                        Classification::Duplicate
                    },
                    affected: Some(d.affected),
                    warnings: d.warnings.clone(),
                    actions: d.actions.clone(),
                    rationale: d.rationale.clone(),
                    failures: Vec::new(),
                })
            }
            Decision::Unique(u) => Some(Self {
                work_path: work_path.to_path_buf(),
                original_paths: Vec::new(),
                classification: Classification::Unique,
                affected: Some(Side::Work),
                warnings: Vec::new(),
                actions: u.actions.clone(),
                rationale: u.rationale.clone(),
                failures: Vec::new(),
            }),
        }
    }

    /// Affected path, when any
    pub fn affected_path(&self) -> Option<&PathBuf> {
        match self.affected? {
            Side::Work => Some(&self.work_path),
            Side::Original => self.original_paths.first(),
        }
    }
}

/// Receives records in work-tree traversal order
pub trait ReportSink {
    fn report(&mut self, record: &DecisionRecord);
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<DecisionRecord>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_records(self) -> Vec<DecisionRecord> {
        self.records
    }
}

impl ReportSink for VecSink {
    fn report(&mut self, record: &DecisionRecord) {
        self.records.push(record.clone());
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Flush buffered lines
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Log into a new file; an existing file is never overwritten
    pub fn create(path: &Path) -> Result<Self, ExecutionError> {
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| ExecutionError::Io {
                op: "create log file",
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn report(&mut self, record: &DecisionRecord) {
        let written = serde_json::to_writer(&mut self.writer, record)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(e) = written {
            tracing::warn!("Failed to write report line: {}", e);
        }
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn report(&mut self, _record: &DecisionRecord) {}
}

impl<S: ReportSink> ReportSink for Option<S> {
    fn report(&mut self, record: &DecisionRecord) {
        if let Some(sink) = self {
            sink.report(record);
        }
    }
}

/// Forwards every record to two sinks
#[derive(Debug, Default)]
pub struct TeeSink<A, B> {
    pub first: A,
    pub second: B,
}

impl<A: ReportSink, B: ReportSink> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: ReportSink, B: ReportSink> ReportSink for TeeSink<A, B> {
    fn report(&mut self, record: &DecisionRecord) {
        self.first.report(record);
        self.second.report(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decision::{Duplicate, NoMatchReason, Unique};

    fn duplicate(affected: Side, suppressed: bool) -> Decision {
        Decision::Duplicate(Duplicate {
            affected,
            affected_path: PathBuf::from(if affected == Side::Work { "/w/a" } else { "/o/a" }),
            counterpart_path: PathBuf::from(if affected == Side::Work { "/o/a" } else { "/w/a" }),
            affected_size: 3,
            actions: vec![],
            warnings: vec![],
            suppressed,
            rationale: "because".to_string(),
        })
    }

    #[test]
    fn no_match_is_not_reported() {
        let decision = Decision::NoMatch(NoMatchReason::SkippedEmpty);
        assert!(DecisionRecord::from_decision(Path::new("/w/a"), &decision).is_none());
    }

    #[test]
    fn original_path_is_the_original_on_either_side() {
        for side in [Side::Work, Side::Original] {
            let record =
                DecisionRecord::from_decision(Path::new("/w/a"), &duplicate(side, false)).unwrap();
            assert_eq!(record.original_paths, vec![PathBuf::from("/o/a")]);
        }

        let flipped =
            DecisionRecord::from_decision(Path::new("/w/a"), &duplicate(Side::Original, false))
                .unwrap();
        assert_eq!(flipped.affected_path(), Some(&PathBuf::from("/o/a")));
    }

    #[test]
    fn suppressed_duplicate_is_classified_as_skipped() {
        let record =
            DecisionRecord::from_decision(Path::new("/w/a"), &duplicate(Side::Work, true)).unwrap();
        assert_eq!(record.classification, Classification::SkippedOnWarning);
    }

    #[test]
    fn unique_has_no_original() {
        let decision = Decision::Unique(Unique {
            path: PathBuf::from("/w/a"),
            size: 1,
            actions: vec![],
            rationale: "alone".to_string(),
        });
        let record = DecisionRecord::from_decision(Path::new("/w/a"), &decision).unwrap();
        assert!(record.original_paths.is_empty());
        assert_eq!(record.classification, Classification::Unique);
    }

    #[test]
    fn json_lines_sink_writes_one_line_per_record() {
        let record =
            DecisionRecord::from_decision(Path::new("/w/a"), &duplicate(Side::Work, false)).unwrap();
        let mut sink = JsonLinesSink::new(Vec::new());

        sink.report(&record);
        sink.report(&record);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 2);
        let parsed: DecisionRecord = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn log_file_is_never_overwritten() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("changes.jsonl");
        let record =
            DecisionRecord::from_decision(Path::new("/w/a"), &duplicate(Side::Work, false)).unwrap();

        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.report(&record);
        sink.finish().unwrap();

        assert!(matches!(
            JsonLinesSink::create(&path),
            Err(ExecutionError::Io { .. })
        ));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn tee_sink_feeds_both_sides() {
        let record =
            DecisionRecord::from_decision(Path::new("/w/a"), &duplicate(Side::Work, false)).unwrap();
        let mut sink = TeeSink::new(VecSink::new(), Some(VecSink::new()));

        sink.report(&record);
        let mut absent: Option<VecSink> = None;
        absent.report(&record);

        assert_eq!(sink.first.records.len(), 1);
        assert_eq!(sink.second.map(|s| s.records.len()), Some(1));
    }
}
