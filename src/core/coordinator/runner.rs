//! Run orchestration.

use super::{CancellationToken, ExecutionMode, RunOutcome, RunSummary};
use crate::core::cache::DescriptorCache;
use crate::core::config::{MatchConfig, RENAME_MARKER};
use crate::core::decision::{Decision, DecisionPolicy, NoMatchReason};
use crate::core::evaluator::{ChecksumCheck, MediaDelta, PairEvaluator};
use crate::core::index::CandidateIndex;
use crate::core::media::{FileMediaBackend, MediaBackend};
use crate::core::normalize::Normalizer;
use crate::core::ops::{CollectingEmitter, CommandEmitter, FilesystemExecutor, FsCommand, StdFsExecutor};
use crate::core::reporter::{DecisionRecord, ReportSink, VecSink};
use crate::core::scanner::{FileRecord, FileScanner, MediaKind, ScanConfig, WalkDirScanner};
use crate::error::{Result, ScanError};
use crate::events::{
    null_sender, Event, EventSender, MatchEvent, MatchProgress, RunEvent, RunPhase,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Builder for a run
pub struct RunCoordinatorBuilder {
    config: MatchConfig,
    backend: Option<Arc<dyn MediaBackend>>,
    executor: Option<Arc<dyn FilesystemExecutor>>,
    mode: ExecutionMode,
    cancellation: CancellationToken,
    skip: usize,
    scan_config: ScanConfig,
}

impl RunCoordinatorBuilder {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            backend: None,
            executor: None,
            mode: ExecutionMode::default(),
            cancellation: CancellationToken::new(),
            skip: 0,
            scan_config: ScanConfig::default(),
        }
    }

    /// Set the media backend (defaults to `FileMediaBackend`)
    pub fn backend(mut self, backend: Arc<dyn MediaBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the filesystem executor (defaults to `StdFsExecutor`)
    pub fn executor(mut self, executor: Arc<dyn FilesystemExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Skip the first `skip` work files
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Only scan files with these extensions
    pub fn suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.scan_config.suffixes = Some(suffixes);
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.scan_config.include_hidden = include;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    pub fn build(self) -> RunCoordinator {
        RunCoordinator {
            config: self.config,
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(FileMediaBackend::new())),
            executor: self.executor.unwrap_or_else(|| Arc::new(StdFsExecutor::new())),
            mode: self.mode,
            cancellation: self.cancellation,
            skip: self.skip,
            scan_config: self.scan_config,
        }
    }
}

/// Matches a work tree against an original tree
pub struct RunCoordinator {
    config: MatchConfig,
    backend: Arc<dyn MediaBackend>,
    executor: Arc<dyn FilesystemExecutor>,
    mode: ExecutionMode,
    cancellation: CancellationToken,
    skip: usize,
    scan_config: ScanConfig,
}

impl RunCoordinator {
    pub fn builder(config: MatchConfig) -> RunCoordinatorBuilder {
        RunCoordinatorBuilder::new(config)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Run without events, collecting records and emitted commands
    pub fn run(&self, work_dir: &Path, original_dir: &Path) -> Result<RunOutcome> {
        let mut sink = VecSink::new();
        let mut emitter = CollectingEmitter::new();
        let summary = self.run_with(work_dir, original_dir, &mut sink, &mut emitter, &null_sender())?;

        Ok(RunOutcome {
            summary,
            records: sink.into_records(),
            commands: emitter.commands,
        })
    }

    /// Run with streaming output and event reporting.
    ///
    /// Both roots are walked before anything is decided, so an inaccessible
    /// root fails the run before any side effect.
    pub fn run_with(
        &self,
        work_dir: &Path,
        original_dir: &Path,
        sink: &mut dyn ReportSink,
        emitter: &mut dyn CommandEmitter,
        events: &EventSender,
    ) -> Result<RunSummary> {
        let start = Instant::now();
        info!("{} ({})", self.config.describe(), self.mode);

        events.send(Event::Run(RunEvent::Started));
        events.send(Event::Run(RunEvent::PhaseChanged {
            phase: RunPhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.effective_scan_config());
        let originals = scanner.scan_with_events(original_dir, events)?;
        let work = scanner.scan_with_events(work_dir, events)?;

        let mut summary = RunSummary::new();
        summary.scan_errors = originals.errors.len() + work.errors.len();

        let mut summary = self.match_files(
            work.files,
            originals.files,
            summary,
            true,
            &mut Outputs {
                sink,
                emitter,
                events,
            },
        );
        summary.duration_ms = start.elapsed().as_millis() as u64;
        Ok(summary)
    }

    /// Match already scanned records; files are not checked for presence
    pub fn process(
        &self,
        work: Vec<FileRecord>,
        originals: Vec<FileRecord>,
        sink: &mut dyn ReportSink,
        emitter: &mut dyn CommandEmitter,
        events: &EventSender,
    ) -> RunSummary {
        let start = Instant::now();
        let mut summary = self.match_files(
            work,
            originals,
            RunSummary::new(),
            false,
            &mut Outputs {
                sink,
                emitter,
                events,
            },
        );
        summary.duration_ms = start.elapsed().as_millis() as u64;
        summary
    }

    fn effective_scan_config(&self) -> ScanConfig {
        let media = self.config.media();
        ScanConfig {
            read_exif: media.media_magic && media.img_compare_date,
            ..self.scan_config.clone()
        }
    }

    fn match_files(
        &self,
        work: Vec<FileRecord>,
        originals: Vec<FileRecord>,
        mut summary: RunSummary,
        verify_presence: bool,
        out: &mut Outputs<'_>,
    ) -> RunSummary {
        let events = out.events;
        let ignore_name = self.config.name().ignore_name;

        events.send(Event::Run(RunEvent::PhaseChanged {
            phase: RunPhase::Indexing,
        }));
        let normalizer = Normalizer::new(self.config.name());
        let index = CandidateIndex::build(originals, &normalizer, ignore_name);
        let cache = DescriptorCache::new(Arc::clone(&self.backend));

        if ignore_name && self.config.media().media_magic {
            events.send(Event::Run(RunEvent::PhaseChanged {
                phase: RunPhase::Preloading,
            }));
            let stats = cache.preload(index.originals(), MediaKind::Image, events);
            info!(
                "Cached {} image hashes, {} unavailable",
                stats.computed, stats.unavailable
            );
        }

        events.send(Event::Run(RunEvent::PhaseChanged {
            phase: RunPhase::Matching,
        }));
        summary.originals_scanned = index.len();
        summary.work_files_scanned = work.len();
        events.send(Event::Match(MatchEvent::Started {
            total_work_files: work.len(),
        }));

        let mut matcher = Matcher {
            coordinator: self,
            evaluator: PairEvaluator::new(&self.config, &normalizer, &cache),
            policy: DecisionPolicy::new(&self.config),
            normalizer: &normalizer,
            index: &index,
            verify_presence,
            passed_away: HashSet::new(),
            reported: HashSet::new(),
            summary,
        };

        let total = work.len();
        if self.skip > 0 {
            info!("Skipping the first {} work files", self.skip.min(total));
        }
        for (i, record) in work.iter().enumerate().skip(self.skip) {
            if self.cancellation.is_cancelled() {
                info!("Cancelled; resume with skip={}", i);
                matcher.summary.cancelled = Some(i);
                events.send(Event::Run(RunEvent::Cancelled { resume_skip: i }));
                break;
            }

            matcher.match_file(record, out);

            events.send(Event::Match(MatchEvent::Progress(MatchProgress {
                processed: i + 1,
                total,
                affectable: matcher.summary.affectable_count,
                affected_bytes: matcher.summary.affected_size,
                current_path: record.path.clone(),
            })));
        }

        let summary = matcher.summary;
        info!(
            "Run {}: {} affectable ({} bytes), {} warned, {} failed",
            summary.run_id,
            summary.affectable_count,
            summary.affected_size,
            summary.warnings_count,
            summary.failures
        );
        events.send(Event::Run(RunEvent::Completed {
            affectable: summary.affectable_count,
            warnings: summary.warnings_count,
            failures: summary.failures,
        }));
        summary
    }
}

/// Where a run's results go
struct Outputs<'o> {
    sink: &'o mut dyn ReportSink,
    emitter: &'o mut dyn CommandEmitter,
    events: &'o EventSender,
}

/// Per-run matching state
struct Matcher<'a> {
    coordinator: &'a RunCoordinator,
    evaluator: PairEvaluator<'a>,
    policy: DecisionPolicy<'a>,
    normalizer: &'a Normalizer,
    index: &'a CandidateIndex,
    verify_presence: bool,
    /// Files an eligible destructive action already targets
    passed_away: HashSet<PathBuf>,
    /// Unordered pairs already reported
    reported: HashSet<(PathBuf, PathBuf)>,
    summary: RunSummary,
}

impl Matcher<'_> {
    fn match_file(&mut self, work: &FileRecord, out: &mut Outputs<'_>) {
        if work.file_name().starts_with(RENAME_MARKER) {
            debug!("Already processed: {}", work.path.display());
            self.summary.ignored += 1;
            return;
        }
        if self.passed_away.contains(&work.path) {
            debug!("Already affected in this run: {}", work.path.display());
            return;
        }
        if self.verify_presence && std::fs::symlink_metadata(&work.path).is_err() {
            let error = ScanError::Vanished {
                path: work.path.clone(),
            };
            warn!("{}", error);
            self.summary.unavailable += 1;
            return;
        }

        let key = self.normalizer.key(&work.stem);
        let candidates: Vec<&FileRecord> = self
            .index
            .lookup(&key)
            .into_iter()
            .filter(|c| {
                c.path != work.path
                    && !self.passed_away.contains(&c.path)
                    && self.evaluator.is_comparable(work, c)
            })
            .collect();

        let mut matched = false;
        let mut unavailable = false;
        let mut found = None;
        for candidate in &candidates {
            if self.reported.contains(&pair_key(&work.path, &candidate.path)) {
                continue;
            }

            let outcome = self.evaluator.evaluate(work, candidate);
            unavailable |= outcome.media == MediaDelta::Unavailable
                || outcome.checksum == ChecksumCheck::Unavailable;

            match self.policy.decide(work, candidate, &outcome) {
                Decision::NoMatch(NoMatchReason::AxisFailed(_)) => continue,
                Decision::NoMatch(reason) => {
                    debug!(
                        "{} matches {} but is skipped: {:?}",
                        work.path.display(),
                        candidate.path.display(),
                        reason
                    );
                    matched = true;
                    break;
                }
                decision => {
                    matched = true;
                    found = Some((decision, candidate.path.clone()));
                    break;
                }
            }
        }
        if unavailable {
            self.summary.unavailable += 1;
        }

        if self.coordinator.config.name().invert_selection {
            if !matched {
                let decision = self.policy.unique(work, candidates.len());
                self.dispatch(work, decision, None, out);
            }
            return;
        }

        match found {
            Some((decision, counterpart)) => self.dispatch(work, decision, Some(counterpart), out),
            None if candidates.len() > 1 && !matched => {
                debug!(
                    "No match for {} among {} candidates",
                    work.path.display(),
                    candidates.len()
                );
                self.summary.unresolved_multi_candidate += 1;
            }
            None => {}
        }
    }

    fn dispatch(
        &mut self,
        work: &FileRecord,
        decision: Decision,
        counterpart: Option<PathBuf>,
        out: &mut Outputs<'_>,
    ) {
        let Some(mut record) = DecisionRecord::from_decision(&work.path, &decision) else {
            return;
        };
        if let Some(counterpart) = counterpart {
            self.reported.insert(pair_key(&work.path, &counterpart));
        }

        let affectable = decision.is_affectable();
        if !decision.warnings().is_empty() {
            self.summary.warnings_count += 1;
        }
        if affectable {
            self.summary.affectable_count += 1;
            self.summary.affected_size += match &decision {
                Decision::Duplicate(d) => d.affected_size,
                Decision::Unique(u) => u.size,
                Decision::NoMatch(_) => 0,
            };
        }
        for action in decision.actions().iter().filter(|a| a.is_destructive()) {
            self.passed_away.insert(action.subject().clone());
        }

        let commands = FsCommand::expand(decision.actions());
        match self.coordinator.mode {
            ExecutionMode::DryRun => {}
            ExecutionMode::Inspect => commands.iter().for_each(|c| out.emitter.emit(c)),
            ExecutionMode::Execute => {
                for command in &commands {
                    if let Err(e) = self.coordinator.executor.execute(command) {
                        // the remaining commands of this pair depend on this one
                        warn!("{}", e);
                        self.summary.failures += 1;
                        record.failures.push(e.to_string());
                        break;
                    }
                }
            }
        }

        info!("{}", record.rationale);
        out.sink.report(&record);
        out.events.send(Event::Match(MatchEvent::Reported {
            work_path: work.path.clone(),
            affectable,
            warnings: decision.warnings().len(),
        }));
    }
}

fn pair_key(a: &Path, b: &Path) -> (PathBuf, PathBuf) {
    if a <= b {
        (a.to_path_buf(), b.to_path_buf())
    } else {
        (b.to_path_buf(), a.to_path_buf())
    }
}
