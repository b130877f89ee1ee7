//! Decision value types.

use crate::core::evaluator::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One file of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Work,
    Original,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Work => Side::Original,
            Side::Original => Side::Work,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Work => write!(f, "work file"),
            Side::Original => write!(f, "original"),
        }
    }
}

/// Advisory finding that suppresses destructive actions unless neglected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    /// The affected file is bigger than its counterpart by `delta` bytes
    Size { delta: u64 },
    /// The `newer` file is `delta` seconds younger than the other one
    Date { delta: i64, newer: Side },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Size { delta } => write!(f, "SIZE WARNING +{} bytes", delta),
            Warning::Date { delta, newer } => {
                write!(f, "DATE WARNING {} newer by {}", newer, human_duration(*delta))
            }
        }
    }
}

/// A requested filesystem change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Prefix the file name with the marker
    Rename { path: PathBuf, target: PathBuf },
    Delete { path: PathBuf },
    /// Overwrite `target` with `source`
    ReplaceWithOriginal { target: PathBuf, source: PathBuf },
    /// Set the modification time of `path` from `from` to `to`
    Redate { path: PathBuf, from: i64, to: i64 },
}

impl Action {
    /// Rename, delete and replace remove or hide the affected file
    pub fn is_destructive(&self) -> bool {
        !matches!(self, Action::Redate { .. })
    }

    /// File whose content or name the action changes
    pub fn subject(&self) -> &PathBuf {
        match self {
            Action::Rename { path, .. } | Action::Delete { path } | Action::Redate { path, .. } => {
                path
            }
            Action::ReplaceWithOriginal { target, .. } => target,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Rename { target, .. } => write!(
                f,
                "rename to {}",
                target.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
            ),
            Action::Delete { .. } => write!(f, "delete"),
            Action::ReplaceWithOriginal { source, .. } => {
                write!(f, "replace with {}", source.display())
            }
            Action::Redate { from, to, .. } => {
                write!(f, "redate {} -> {}", format_time(*from), format_time(*to))
            }
        }
    }
}

/// Why a pair is not a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoMatchReason {
    AxisFailed(Axis),
    /// The affected file would be bigger than its counterpart
    SkippedBigger,
    /// The affected file is empty
    SkippedEmpty,
}

/// A matched pair and what to do about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duplicate {
    pub affected: Side,
    pub affected_path: PathBuf,
    pub counterpart_path: PathBuf,
    pub affected_size: u64,
    /// Eligible actions, redate first
    pub actions: Vec<Action>,
    pub warnings: Vec<Warning>,
    /// Destructive actions were dropped because of warnings
    pub suppressed: bool,
    pub rationale: String,
}

/// A work file without any counterpart (`invert_selection`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unique {
    pub path: PathBuf,
    pub size: u64,
    pub actions: Vec<Action>,
    pub rationale: String,
}

/// Final classification of a pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    NoMatch(NoMatchReason),
    Duplicate(Duplicate),
    Unique(Unique),
}

impl Decision {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Decision::Duplicate(_))
    }

    /// Terminal state of the pair
    pub fn state(&self) -> PairState {
        match self {
            Decision::NoMatch(_) => PairState::NoMatch,
            Decision::Duplicate(d) if d.suppressed => PairState::MatchedWarnedSuppressed,
            Decision::Duplicate(_) | Decision::Unique(_) => PairState::MatchedActionable,
        }
    }

    /// Not suppressed by warnings: counted as affected
    pub fn is_affectable(&self) -> bool {
        self.state() == PairState::MatchedActionable
    }

    pub fn actions(&self) -> &[Action] {
        match self {
            Decision::NoMatch(_) => &[],
            Decision::Duplicate(d) => &d.actions,
            Decision::Unique(u) => &u.actions,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Decision::Duplicate(d) => &d.warnings,
            _ => &[],
        }
    }
}

/// Lifecycle of one pair; every run visits a pair at most once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairState {
    Scanned,
    Evaluated,
    NoMatch,
    MatchedWarnedSuppressed,
    MatchedActionable,
}

impl PairState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PairState::Scanned | PairState::Evaluated)
    }
}

/// Local time as "YYYY-MM-DD HH:MM:SS"
pub fn format_time(secs: i64) -> String {
    use chrono::{Local, TimeZone};
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn human_duration(secs: i64) -> String {
    let secs = secs.abs();
    match secs {
        s if s < 60 => format!("{} s", s),
        s if s < 3600 => format!("{} min", s / 60),
        s if s < 86_400 => format!("{} h", s / 3600),
        s => format!("{} days", s / 86_400),
    }
}
