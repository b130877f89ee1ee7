//! # Config Module
//!
//! The single immutable configuration snapshot of a run.
//!
//! `MatchSettings` is the flat bag of toggles a user (CLI, settings file,
//! GUI) fills in. `MatchSettings::validate` turns it into a `MatchConfig`,
//! rejecting invalid combinations before any directory is touched. The
//! destructive action is a tagged enum, so "rename and delete" cannot be
//! represented once validated.
//!
//! ## Example
//! ```rust,ignore
//! let config = MatchSettings {
//!     rename: true,
//!     ignore_date: true,
//!     ..Default::default()
//! }
//! .validate()?;
//! ```

mod tolerance;

pub use tolerance::HourTolerance;

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix prepended to a file name by the rename action
pub const RENAME_MARKER: char = '✓';

/// The destructive action applied to the affected file of a duplicate pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestructiveAction {
    /// Prefix the affected file name with the marker
    Rename,
    /// Remove the affected file
    Delete,
    /// Overwrite the affected file with its counterpart
    ReplaceWithOriginal,
}

impl DestructiveAction {
    /// Option name as written by the user
    pub fn option_name(&self) -> &'static str {
        match self {
            DestructiveAction::Rename => "rename",
            DestructiveAction::Delete => "delete",
            DestructiveAction::ReplaceWithOriginal => "replace_with_original",
        }
    }
}

impl std::fmt::Display for DestructiveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestructiveAction::Rename => write!(f, "renamed (prefixed with {})", RENAME_MARKER),
            DestructiveAction::Delete => write!(f, "deleted"),
            DestructiveAction::ReplaceWithOriginal => write!(f, "replaced with the original"),
        }
    }
}

/// Raw, unvalidated toggles.
///
/// Every field has a neutral default; deserializing a partial JSON object
/// is supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    // Name rules
    /// Files are not compared by stem nor suffix
    pub ignore_name: bool,
    /// Case insensitive name comparison
    pub casefold: bool,
    /// Compare spaces as this character ("file 012" ~ "file_012")
    pub space2char: Option<char>,
    /// Strip a trailing "(3)" counter from the stem
    pub strip_end_counter: bool,
    /// Strip the stem end matched by this regular expression
    pub strip_suffix: Option<String>,
    /// Compare stems shortened to this many characters
    pub work_file_stem_shortened: Option<usize>,
    /// Select work files that do NOT match
    pub invert_selection: bool,

    // Date rules
    /// Files are not compared by modification time
    pub ignore_date: bool,
    /// Accepted modification time shift in hours
    pub tolerate_hour: HourTolerance,

    // Size and content rules
    /// Files are not compared by size
    pub ignore_size: bool,
    /// Additionally compare equal-sized files by content digest
    pub checksum: bool,

    // Media rules
    /// Compare images by perceptual hash and videos by frame count
    pub media_magic: bool,
    /// Maximum accepted frame count difference for videos
    pub accepted_frame_delta: u64,
    /// Maximum accepted image hash distance
    pub accepted_img_hash_diff: u32,
    /// Images must additionally be taken within an hour of each other
    pub img_compare_date: bool,

    // Action rules
    pub rename: bool,
    pub delete: bool,
    pub replace_with_original: bool,
    /// Set both files to the older modification time
    pub set_both_to_older_date: bool,
    /// Affect the original instead when it is the smaller file
    pub treat_bigger_as_original: bool,
    /// Only affect a file not bigger than its counterpart
    pub skip_bigger: bool,
    /// Skip zero-sized files
    pub skip_empty: bool,
    /// Proceed with actions despite warnings
    pub neglect_warning: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            ignore_name: false,
            casefold: false,
            space2char: None,
            strip_end_counter: false,
            strip_suffix: None,
            work_file_stem_shortened: None,
            invert_selection: false,
            ignore_date: false,
            tolerate_hour: HourTolerance::Exact,
            ignore_size: false,
            checksum: false,
            media_magic: false,
            accepted_frame_delta: 1,
            accepted_img_hash_diff: 1,
            img_compare_date: false,
            rename: false,
            delete: false,
            replace_with_original: false,
            set_both_to_older_date: false,
            treat_bigger_as_original: false,
            skip_bigger: false,
            skip_empty: false,
            neglect_warning: false,
        }
    }
}

impl MatchSettings {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Validate the combination of toggles and freeze it.
    pub fn validate(self) -> Result<MatchConfig, ConfigError> {
        let action = self.selected_action()?;

        if self.checksum && self.ignore_size {
            return Err(ConfigError::ChecksumWithoutSize);
        }
        if self.ignore_name && self.ignore_date && self.ignore_size {
            return Err(ConfigError::EverythingIgnored);
        }
        if self.invert_selection {
            let conflicting = [
                (self.replace_with_original, "replace_with_original"),
                (self.treat_bigger_as_original, "treat_bigger_as_original"),
                (self.set_both_to_older_date, "set_both_to_older_date"),
            ];
            if let Some((_, option)) = conflicting.iter().find(|(set, _)| *set) {
                return Err(ConfigError::InvertWithCounterpartAction { option });
            }
        }
        if let HourTolerance::Window { low, high } = self.tolerate_hour {
            if low > high {
                return Err(ConfigError::InvalidHourWindow { low, high });
            }
        }

        let strip_suffix = match self.strip_suffix.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(
                RegexBuilder::new(&format!("(?:{})$", pattern))
                    .case_insensitive(self.casefold)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    })?,
            ),
            _ => None,
        };

        Ok(MatchConfig {
            name: NameRules {
                ignore_name: self.ignore_name,
                casefold: self.casefold,
                space2char: self.space2char,
                strip_end_counter: self.strip_end_counter,
                strip_suffix,
                work_file_stem_shortened: self.work_file_stem_shortened.filter(|n| *n > 0),
                invert_selection: self.invert_selection,
            },
            date: DateRules {
                ignore_date: self.ignore_date,
                tolerate_hour: self.tolerate_hour,
            },
            content: ContentRules {
                ignore_size: self.ignore_size,
                checksum: self.checksum,
            },
            media: MediaRules {
                media_magic: self.media_magic,
                accepted_frame_delta: self.accepted_frame_delta,
                accepted_img_hash_diff: self.accepted_img_hash_diff,
                img_compare_date: self.img_compare_date,
            },
            action: ActionRules {
                action,
                set_both_to_older_date: self.set_both_to_older_date,
                treat_bigger_as_original: self.treat_bigger_as_original,
                skip_bigger: self.skip_bigger,
                skip_empty: self.skip_empty,
                neglect_warning: self.neglect_warning,
            },
            settings: self,
        })
    }

    fn selected_action(&self) -> Result<Option<DestructiveAction>, ConfigError> {
        let requested: Vec<DestructiveAction> = [
            (self.rename, DestructiveAction::Rename),
            (self.delete, DestructiveAction::Delete),
            (self.replace_with_original, DestructiveAction::ReplaceWithOriginal),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .map(|(_, action)| action)
        .collect();

        match requested.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            [first, second, ..] => Err(ConfigError::ConflictingActions {
                first: first.option_name(),
                second: second.option_name(),
            }),
        }
    }
}

/// How names are turned into comparison keys
#[derive(Debug, Clone)]
pub struct NameRules {
    pub ignore_name: bool,
    pub casefold: bool,
    pub space2char: Option<char>,
    pub strip_end_counter: bool,
    /// Anchored at the stem end
    pub strip_suffix: Option<Regex>,
    pub work_file_stem_shortened: Option<usize>,
    pub invert_selection: bool,
}

/// Modification time rules
#[derive(Debug, Clone, Copy)]
pub struct DateRules {
    pub ignore_date: bool,
    pub tolerate_hour: HourTolerance,
}

/// Size and content rules
#[derive(Debug, Clone, Copy)]
pub struct ContentRules {
    pub ignore_size: bool,
    pub checksum: bool,
}

/// Media comparison rules
#[derive(Debug, Clone, Copy)]
pub struct MediaRules {
    pub media_magic: bool,
    pub accepted_frame_delta: u64,
    pub accepted_img_hash_diff: u32,
    pub img_compare_date: bool,
}

/// What happens to a duplicate pair
#[derive(Debug, Clone, Copy)]
pub struct ActionRules {
    pub action: Option<DestructiveAction>,
    pub set_both_to_older_date: bool,
    pub treat_bigger_as_original: bool,
    pub skip_bigger: bool,
    pub skip_empty: bool,
    pub neglect_warning: bool,
}

/// Validated, immutable configuration shared read-only by a whole run
#[derive(Debug, Clone)]
pub struct MatchConfig {
    name: NameRules,
    date: DateRules,
    content: ContentRules,
    media: MediaRules,
    action: ActionRules,
    settings: MatchSettings,
}

impl MatchConfig {
    pub fn name(&self) -> &NameRules {
        &self.name
    }

    pub fn date(&self) -> &DateRules {
        &self.date
    }

    pub fn content(&self) -> &ContentRules {
        &self.content
    }

    pub fn media(&self) -> &MediaRules {
        &self.media
    }

    pub fn action(&self) -> &ActionRules {
        &self.action
    }

    /// The settings this configuration was validated from (for reports)
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// One-line description of the matching criteria
    pub fn describe(&self) -> String {
        if self.media.media_magic {
            let name = if self.name.ignore_name {
                " Nor the name!"
            } else {
                ""
            };
            return format!(
                "Media files are compared by content: nor the size nor the date is compared.{}",
                name
            );
        }

        let axes = [
            ("name", !self.name.ignore_name),
            ("size", !self.content.ignore_size),
            ("date", !self.date.ignore_date),
            ("checksum", self.content.checksum),
        ];
        let used: Vec<&str> = axes.iter().filter(|(_, on)| *on).map(|(n, _)| *n).collect();
        let ignored: Vec<&str> = axes.iter().filter(|(_, on)| !*on).map(|(n, _)| *n).collect();

        if ignored.is_empty() {
            format!("Find files by {}", used.join(", "))
        } else {
            format!(
                "Find files by {}, ignoring: {}",
                used.join(", "),
                ignored.join(", ")
            )
        }
    }
}

impl TryFrom<MatchSettings> for MatchConfig {
    type Error = ConfigError;

    fn try_from(settings: MatchSettings) -> Result<Self, Self::Error> {
        settings.validate()
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            name: NameRules {
                ignore_name: false,
                casefold: false,
                space2char: None,
                strip_end_counter: false,
                strip_suffix: None,
                work_file_stem_shortened: None,
                invert_selection: false,
            },
            date: DateRules {
                ignore_date: false,
                tolerate_hour: HourTolerance::Exact,
            },
            content: ContentRules {
                ignore_size: false,
                checksum: false,
            },
            media: MediaRules {
                media_magic: false,
                accepted_frame_delta: 1,
                accepted_img_hash_diff: 1,
                img_compare_date: false,
            },
            action: ActionRules {
                action: None,
                set_both_to_older_date: false,
                treat_bigger_as_original: false,
                skip_bigger: false,
                skip_empty: false,
                neglect_warning: false,
            },
            settings: MatchSettings::default(),
        }
    }
}
