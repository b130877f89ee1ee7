//! Plain-text helpers shared by front-ends.

use super::DecisionRecord;
use crate::core::decision::{Action, Side, Warning};
use std::path::Path;

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Path with the home directory shortened to `~`
pub fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

/// Notes attached to one file of a reported pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideNotes {
    pub work: Vec<String>,
    pub original: Vec<String>,
}

impl SideNotes {
    /// Sort warnings and actions of a record under the file they concern
    pub fn of(record: &DecisionRecord) -> Self {
        let mut notes = SideNotes::default();

        for warning in &record.warnings {
            let side = match warning {
                Warning::Size { .. } => record.affected.unwrap_or(Side::Work),
                Warning::Date { newer, .. } => *newer,
            };
            notes.side_mut(side).push(warning.to_string());
        }

        for action in &record.actions {
            let side = if action.subject() == &record.work_path {
                Side::Work
            } else {
                Side::Original
            };
            let note = match action {
                Action::ReplaceWithOriginal { .. } => "replaced with the original".to_string(),
                other => other.to_string(),
            };
            notes.side_mut(side).push(note);
        }

        notes
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<String> {
        match side {
            Side::Work => &mut self.work,
            Side::Original => &mut self.original,
        }
    }
}
