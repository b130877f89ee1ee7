//! # Decision Module
//!
//! Turns a comparison outcome into a `Decision`.
//!
//! ## Steps
//! 1. A failed axis ends in `NoMatch`
//! 2. The work file is affected; with `treat_bigger_as_original` a strictly
//!    smaller original is affected instead
//! 3. `skip_bigger`: an affected file bigger than its counterpart is not
//!    touched (evaluated after step 2)
//! 4. `skip_empty`: an empty affected file is not touched
//! 5. Warnings: the affected file is bigger (size), or the counterpart is at
//!    least a second newer (date)
//! 6. Without `neglect_warning` any warning drops the destructive action and
//!    a date warning also drops the redate
//! 7. Actions: redate first (`set_both_to_older_date`, when dates do not
//!    decide the match), then the configured destructive action
//!
//! Every step is a separate function so each branch can be tested alone.

mod types;

pub use types::{
    format_time, Action, Decision, Duplicate, NoMatchReason, PairState, Side, Unique, Warning,
};

use crate::core::config::{DestructiveAction, MatchConfig, RENAME_MARKER};
use crate::core::evaluator::{ComparisonOutcome, EvaluationMode};
use crate::core::scanner::FileRecord;
use std::path::Path;
use tracing::debug;

/// Affected and counterpart file of a matched pair
#[derive(Debug, Clone, Copy)]
struct Orientation<'r> {
    side: Side,
    affected: &'r FileRecord,
    other: &'r FileRecord,
}

/// Applies the action rules of one configuration
pub struct DecisionPolicy<'a> {
    config: &'a MatchConfig,
}

impl<'a> DecisionPolicy<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    pub fn decide(
        &self,
        work: &FileRecord,
        candidate: &FileRecord,
        outcome: &ComparisonOutcome,
    ) -> Decision {
        if let Some(axis) = outcome.failed_axis() {
            return Decision::NoMatch(NoMatchReason::AxisFailed(axis));
        }

        let orientation = self.resolve_affected(work, candidate);
        if let Some(reason) = self
            .gate_bigger(&orientation)
            .or_else(|| self.gate_empty(&orientation))
        {
            debug!("Skipping {}: {:?}", orientation.affected.path.display(), reason);
            return Decision::NoMatch(reason);
        }

        let warnings = self.classify_warnings(&orientation);
        let neglect = self.config.action().neglect_warning;
        let suppressed = !warnings.is_empty() && !neglect;
        let date_warned = !neglect && warnings.iter().any(|w| matches!(w, Warning::Date { .. }));

        let mut actions = Vec::new();
        if !date_warned {
            actions.extend(self.redate(&orientation, outcome));
        }
        if !suppressed {
            actions.extend(self.destructive(orientation.affected, orientation.other));
        }

        let mut rationale = format!(
            "{} {} duplicates {}: {}",
            orientation.side,
            orientation.affected.file_name(),
            orientation.other.path.display(),
            outcome.summary()
        );
        if suppressed {
            rationale.push_str(", skipped on warning");
        }

        Decision::Duplicate(Duplicate {
            affected: orientation.side,
            affected_path: orientation.affected.path.clone(),
            counterpart_path: orientation.other.path.clone(),
            affected_size: orientation.affected.size,
            actions,
            warnings,
            suppressed,
            rationale,
        })
    }

    /// Decision for a work file that matched nothing, under `invert_selection`
    pub fn unique(&self, work: &FileRecord, candidates: usize) -> Decision {
        if self.config.action().skip_empty && work.size == 0 {
            debug!("Skipping empty {}", work.path.display());
            return Decision::NoMatch(NoMatchReason::SkippedEmpty);
        }

        let actions = match self.config.action().action {
            Some(DestructiveAction::Rename) => vec![rename(&work.path)],
            Some(DestructiveAction::Delete) => vec![Action::Delete {
                path: work.path.clone(),
            }],
            // rejected at validation: there is no counterpart
            Some(DestructiveAction::ReplaceWithOriginal) | None => Vec::new(),
        };

        Decision::Unique(Unique {
            path: work.path.clone(),
            size: work.size,
            actions,
            rationale: format!(
                "{} has no duplicate among {} candidate(s)",
                work.file_name(),
                candidates
            ),
        })
    }

    fn resolve_affected<'r>(&self, work: &'r FileRecord, candidate: &'r FileRecord) -> Orientation<'r> {
        if self.config.action().treat_bigger_as_original && candidate.size < work.size {
            Orientation {
                side: Side::Original,
                affected: candidate,
                other: work,
            }
        } else {
            Orientation {
                side: Side::Work,
                affected: work,
                other: candidate,
            }
        }
    }

    fn gate_bigger(&self, o: &Orientation) -> Option<NoMatchReason> {
        (self.config.action().skip_bigger && o.affected.size > o.other.size)
            .then_some(NoMatchReason::SkippedBigger)
    }

    fn gate_empty(&self, o: &Orientation) -> Option<NoMatchReason> {
        (self.config.action().skip_empty && o.affected.size == 0).then_some(NoMatchReason::SkippedEmpty)
    }

    fn classify_warnings(&self, o: &Orientation) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if o.affected.size > o.other.size {
            warnings.push(Warning::Size {
                delta: o.affected.size - o.other.size,
            });
        }

        let newer_by = o.other.modified - o.affected.modified;
        if newer_by >= 1 {
            warnings.push(Warning::Date {
                delta: newer_by,
                newer: o.side.other(),
            });
        }

        warnings
    }

    fn redate(&self, o: &Orientation, outcome: &ComparisonOutcome) -> Option<Action> {
        let applicable = self.config.action().set_both_to_older_date
            && (outcome.mode == EvaluationMode::Media || self.config.date().ignore_date);
        if !applicable || o.affected.modified == o.other.modified {
            return None;
        }

        let (newer, older) = if o.affected.modified > o.other.modified {
            (o.affected, o.other)
        } else {
            (o.other, o.affected)
        };
        Some(Action::Redate {
            path: newer.path.clone(),
            from: newer.modified,
            to: older.modified,
        })
    }

    fn destructive(&self, affected: &FileRecord, other: &FileRecord) -> Option<Action> {
        let action = match self.config.action().action? {
            DestructiveAction::Rename => rename(&affected.path),
            DestructiveAction::Delete => Action::Delete {
                path: affected.path.clone(),
            },
            DestructiveAction::ReplaceWithOriginal => Action::ReplaceWithOriginal {
                target: affected.path.clone(),
                source: other.path.clone(),
            },
        };
        Some(action)
    }
}

fn rename(path: &Path) -> Action {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Action::Rename {
        path: path.to_path_buf(),
        target: path.with_file_name(format!("{}{}", RENAME_MARKER, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::DescriptorCache;
    use crate::core::config::MatchSettings;
    use crate::core::evaluator::{Axis, PairEvaluator};
    use crate::core::hasher::ImageHashValue;
    use crate::core::media::{MediaBackend, MediaDescriptor};
    use crate::core::normalize::Normalizer;
    use crate::error::DescriptorError;
    use std::path::PathBuf;
    use std::sync::Arc;

    const T: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;

    struct NoBackend;

    impl MediaBackend for NoBackend {
        fn image_hash(&self, path: &Path) -> Result<ImageHashValue, DescriptorError> {
            Err(DescriptorError::UnsupportedKind {
                path: path.to_path_buf(),
            })
        }

        fn frame_count(&self, path: &Path) -> Result<u64, DescriptorError> {
            Err(DescriptorError::UnsupportedKind {
                path: path.to_path_buf(),
            })
        }
    }

    fn decide(settings: MatchSettings, work: &FileRecord, original: &FileRecord) -> Decision {
        let config = settings.validate().unwrap();
        let normalizer = Normalizer::new(config.name());
        let cache = DescriptorCache::new(Arc::new(NoBackend));
        let outcome = PairEvaluator::new(&config, &normalizer, &cache).evaluate(work, original);
        DecisionPolicy::new(&config).decide(work, original, &outcome)
    }

    fn duplicate(decision: Decision) -> Duplicate {
        match decision {
            Decision::Duplicate(d) => d,
            other => panic!("expected a duplicate, got {:?}", other),
        }
    }

    fn image(path: &str, size: u64, modified: i64) -> FileRecord {
        FileRecord::new(path, size, modified)
            .with_descriptor(MediaDescriptor::ImageHash(ImageHashValue::new(7)))
    }

    #[test]
    fn failed_axis_is_no_match() {
        let decision = decide(
            MatchSettings::default(),
            &FileRecord::new("/w/foo.txt", 1, T),
            &FileRecord::new("/o/foo.txt", 2, T),
        );
        assert_eq!(decision, Decision::NoMatch(NoMatchReason::AxisFailed(Axis::Size)));
    }

    #[test]
    fn identical_files_are_renamed_without_warning() {
        let d = duplicate(decide(
            MatchSettings {
                rename: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 500, T),
            &FileRecord::new("/o/foo.txt", 500, T),
        ));

        assert_eq!(d.affected, Side::Work);
        assert!(d.warnings.is_empty());
        assert!(!d.suppressed);
        assert_eq!(
            d.actions,
            vec![Action::Rename {
                path: PathBuf::from("/w/foo.txt"),
                target: PathBuf::from("/w/✓foo.txt"),
            }]
        );
    }

    #[test]
    fn older_original_is_redate_target_without_warning() {
        let d = duplicate(decide(
            MatchSettings {
                rename: true,
                ignore_date: true,
                set_both_to_older_date: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 500, T),
            &FileRecord::new("/o/foo.txt", 500, T - 2 * DAY),
        ));

        assert!(d.warnings.is_empty());
        assert_eq!(
            d.actions,
            vec![
                Action::Redate {
                    path: PathBuf::from("/w/foo.txt"),
                    from: T,
                    to: T - 2 * DAY,
                },
                Action::Rename {
                    path: PathBuf::from("/w/foo.txt"),
                    target: PathBuf::from("/w/✓foo.txt"),
                },
            ]
        );
    }

    #[test]
    fn newer_original_raises_date_warning_and_suppresses_everything() {
        let d = duplicate(decide(
            MatchSettings {
                rename: true,
                ignore_date: true,
                set_both_to_older_date: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 500, T - DAY),
            &FileRecord::new("/o/foo.txt", 500, T),
        ));

        assert_eq!(
            d.warnings,
            vec![Warning::Date {
                delta: DAY,
                newer: Side::Original
            }]
        );
        assert!(d.suppressed);
        assert!(d.actions.is_empty());
    }

    #[test]
    fn neglect_warning_keeps_actions_and_warning() {
        let d = duplicate(decide(
            MatchSettings {
                delete: true,
                ignore_date: true,
                set_both_to_older_date: true,
                neglect_warning: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 500, T - DAY),
            &FileRecord::new("/o/foo.txt", 500, T),
        ));

        assert_eq!(d.warnings.len(), 1);
        assert!(!d.suppressed);
        assert_eq!(
            d.actions,
            vec![
                Action::Redate {
                    path: PathBuf::from("/o/foo.txt"),
                    from: T,
                    to: T - DAY,
                },
                Action::Delete {
                    path: PathBuf::from("/w/foo.txt")
                },
            ]
        );
    }

    #[test]
    fn sub_second_older_work_file_is_not_warned() {
        let d = duplicate(decide(
            MatchSettings {
                ignore_date: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 1, T),
            &FileRecord::new("/o/foo.txt", 1, T),
        ));
        assert!(d.warnings.is_empty());
    }

    #[test]
    fn bigger_work_file_raises_size_warning() {
        let d = duplicate(decide(
            MatchSettings {
                media_magic: true,
                rename: true,
                ..Default::default()
            },
            &image("/w/a.jpg", 200, T),
            &image("/o/a.jpg", 100, T),
        ));

        assert_eq!(d.warnings, vec![Warning::Size { delta: 100 }]);
        assert!(d.suppressed);
        assert!(d.actions.is_empty());
    }

    #[test]
    fn size_warning_does_not_block_redate() {
        let d = duplicate(decide(
            MatchSettings {
                media_magic: true,
                rename: true,
                set_both_to_older_date: true,
                ..Default::default()
            },
            &image("/w/a.jpg", 200, T),
            &image("/o/a.jpg", 100, T - DAY),
        ));

        assert!(d.suppressed);
        assert_eq!(
            d.actions,
            vec![Action::Redate {
                path: PathBuf::from("/w/a.jpg"),
                from: T,
                to: T - DAY,
            }]
        );
    }

    #[test]
    fn treat_bigger_as_original_flips_to_smaller_original() {
        let d = duplicate(decide(
            MatchSettings {
                media_magic: true,
                replace_with_original: true,
                treat_bigger_as_original: true,
                ..Default::default()
            },
            &image("/w/a.jpg", 200, T),
            &image("/o/a.jpg", 100, T),
        ));

        assert_eq!(d.affected, Side::Original);
        assert!(d.warnings.is_empty());
        assert_eq!(
            d.actions,
            vec![Action::ReplaceWithOriginal {
                target: PathBuf::from("/o/a.jpg"),
                source: PathBuf::from("/w/a.jpg"),
            }]
        );
    }

    #[test]
    fn skip_bigger_uses_post_flip_sides() {
        let work = image("/w/a.jpg", 200, T);
        let original = image("/o/a.jpg", 100, T);

        let plain = decide(
            MatchSettings {
                media_magic: true,
                skip_bigger: true,
                ..Default::default()
            },
            &work,
            &original,
        );
        assert_eq!(plain, Decision::NoMatch(NoMatchReason::SkippedBigger));

        let flipped = decide(
            MatchSettings {
                media_magic: true,
                skip_bigger: true,
                treat_bigger_as_original: true,
                ..Default::default()
            },
            &work,
            &original,
        );
        assert_eq!(duplicate(flipped).affected, Side::Original);
    }

    #[test]
    fn skip_bigger_passes_equal_sizes() {
        let decision = decide(
            MatchSettings {
                skip_bigger: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 5, T),
            &FileRecord::new("/o/foo.txt", 5, T),
        );
        assert!(decision.is_duplicate());
    }

    #[test]
    fn skip_empty_excludes_empty_affected_file() {
        let decision = decide(
            MatchSettings {
                skip_empty: true,
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 0, T),
            &FileRecord::new("/o/foo.txt", 0, T),
        );
        assert_eq!(decision, Decision::NoMatch(NoMatchReason::SkippedEmpty));
    }

    #[test]
    fn redate_needs_dates_out_of_the_match() {
        let d = duplicate(decide(
            MatchSettings {
                set_both_to_older_date: true,
                tolerate_hour: crate::core::config::HourTolerance::symmetric(1),
                ..Default::default()
            },
            &FileRecord::new("/w/foo.txt", 5, T),
            &FileRecord::new("/o/foo.txt", 5, T - 60),
        ));
        assert!(d.actions.is_empty());
    }

    #[test]
    fn empty_unique_file_is_skipped() {
        let config = MatchSettings {
            delete: true,
            invert_selection: true,
            skip_empty: true,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let work = FileRecord::new("/w/empty.txt", 0, T);

        let decision = DecisionPolicy::new(&config).unique(&work, 1);

        assert_eq!(decision, Decision::NoMatch(NoMatchReason::SkippedEmpty));
        assert!(decision.actions().is_empty());
    }

    #[test]
    fn unique_gets_rename_of_work_file() {
        let config = MatchSettings {
            rename: true,
            invert_selection: true,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let work = FileRecord::new("/w/lonely.txt", 3, T);

        let decision = DecisionPolicy::new(&config).unique(&work, 0);

        assert_eq!(decision.state(), PairState::MatchedActionable);
        assert_eq!(
            decision.actions(),
            &[Action::Rename {
                path: PathBuf::from("/w/lonely.txt"),
                target: PathBuf::from("/w/✓lonely.txt"),
            }]
        );
    }
}
