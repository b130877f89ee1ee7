//! # CLI Module
//!
//! Command-line interface for the duplicate file matcher.
//!
//! ## Usage
//! ```bash
//! # Report work files that duplicate an original (nothing is touched)
//! dupe-match ~/work ~/originals
//!
//! # Tolerant media matching, printing the shell commands it would run
//! dupe-match ~/work ~/originals --media-magic --ignore-name --rename --inspect
//!
//! # Apply, with settings from a file
//! dupe-match ~/work ~/originals --settings dedup.json --execute
//! ```

mod shell;

use clap::{Args, Parser, ValueEnum};
use console::{style, Term};
use duplicate_file_matcher::core::config::{HourTolerance, MatchSettings};
use duplicate_file_matcher::core::coordinator::{
    CancellationToken, ExecutionMode, RunCoordinator, RunSummary,
};
use duplicate_file_matcher::core::media::FileMediaBackend;
use duplicate_file_matcher::core::reporter::{
    display_path, format_bytes, Classification, DecisionRecord, JsonLinesSink, SideNotes, TeeSink,
    VecSink,
};
use duplicate_file_matcher::error::Result;
use duplicate_file_matcher::events::{
    DescriptorEvent, Event, EventChannel, MatchEvent, RunEvent, ScanEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use shell::ShellEmitter;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Duplicate File Matcher - find what the work folder duplicates from the originals
#[derive(Parser, Debug)]
#[command(name = "dupe-match")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder suspected of holding duplicates
    work_dir: PathBuf,

    /// Folder with the authoritative copies
    original_dir: PathBuf,

    /// Base settings as JSON; flags given here override it
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    matching: MatchArgs,

    /// Perform the actions
    #[arg(long, conflicts_with = "inspect")]
    execute: bool,

    /// Print the shell commands that --execute would run
    #[arg(long)]
    inspect: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Also write every decision as a JSON line to this new file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Skip the first N work files (resume an interrupted run)
    #[arg(long, default_value_t = 0)]
    skip: usize,

    /// Only consider these extensions (comma separated)
    #[arg(long, value_delimiter = ',')]
    suffixes: Option<Vec<String>>,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// ffprobe executable used to count video frames
    #[arg(long, default_value = "ffprobe")]
    ffprobe: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Matching toggles; each one set here overrides `--settings`
#[derive(Args, Debug, Default)]
struct MatchArgs {
    /// Do not compare names
    #[arg(long)]
    ignore_name: bool,
    /// Case insensitive names
    #[arg(long)]
    casefold: bool,
    /// Compare spaces as this character
    #[arg(long, value_name = "CHAR")]
    space2char: Option<char>,
    /// Strip a trailing "(N)" counter from names
    #[arg(long)]
    strip_end_counter: bool,
    /// Strip the name end matching this regular expression
    #[arg(long, value_name = "REGEX")]
    strip_suffix: Option<String>,
    /// Compare names shortened to N characters
    #[arg(long, value_name = "N")]
    work_file_stem_shortened: Option<usize>,
    /// Report work files WITHOUT a duplicate instead
    #[arg(long)]
    invert_selection: bool,

    /// Do not compare modification times
    #[arg(long)]
    ignore_date: bool,
    /// Accepted time shift in hours: N, LOW,HIGH or true
    #[arg(long, value_name = "HOURS", value_parser = parse_tolerance, allow_hyphen_values = true)]
    tolerate_hour: Option<HourTolerance>,

    /// Do not compare sizes
    #[arg(long)]
    ignore_size: bool,
    /// Also compare content digests of equal-sized files
    #[arg(long)]
    checksum: bool,

    /// Compare images and videos by content
    #[arg(long)]
    media_magic: bool,
    /// Accepted video frame count difference
    #[arg(long, value_name = "N")]
    accepted_frame_delta: Option<u64>,
    /// Accepted image hash distance
    #[arg(long, value_name = "N")]
    accepted_img_hash_diff: Option<u32>,
    /// Images must also be taken within an hour
    #[arg(long)]
    img_compare_date: bool,

    /// Prefix duplicates with ✓
    #[arg(long)]
    rename: bool,
    /// Delete duplicates
    #[arg(long)]
    delete: bool,
    /// Replace duplicates with their original
    #[arg(long)]
    replace_with_original: bool,
    /// Set both files to the older modification time
    #[arg(long)]
    set_both_to_older_date: bool,
    /// Affect the original when it is the smaller file
    #[arg(long)]
    treat_bigger_as_original: bool,
    /// Only affect a file not bigger than its counterpart
    #[arg(long)]
    skip_bigger: bool,
    /// Skip empty files
    #[arg(long)]
    skip_empty: bool,
    /// Act despite warnings
    #[arg(long)]
    neglect_warning: bool,
}

impl MatchArgs {
    fn apply(&self, settings: &mut MatchSettings) {
        let flags = [
            (self.ignore_name, &mut settings.ignore_name),
            (self.casefold, &mut settings.casefold),
            (self.strip_end_counter, &mut settings.strip_end_counter),
            (self.invert_selection, &mut settings.invert_selection),
            (self.ignore_date, &mut settings.ignore_date),
            (self.ignore_size, &mut settings.ignore_size),
            (self.checksum, &mut settings.checksum),
            (self.media_magic, &mut settings.media_magic),
            (self.img_compare_date, &mut settings.img_compare_date),
            (self.rename, &mut settings.rename),
            (self.delete, &mut settings.delete),
            (self.replace_with_original, &mut settings.replace_with_original),
            (self.set_both_to_older_date, &mut settings.set_both_to_older_date),
            (self.treat_bigger_as_original, &mut settings.treat_bigger_as_original),
            (self.skip_bigger, &mut settings.skip_bigger),
            (self.skip_empty, &mut settings.skip_empty),
            (self.neglect_warning, &mut settings.neglect_warning),
        ];
        for (given, field) in flags {
            if given {
                *field = true;
            }
        }

        if self.space2char.is_some() {
            settings.space2char = self.space2char;
        }
        if self.strip_suffix.is_some() {
            settings.strip_suffix = self.strip_suffix.clone();
        }
        if self.work_file_stem_shortened.is_some() {
            settings.work_file_stem_shortened = self.work_file_stem_shortened;
        }
        if let Some(tolerance) = self.tolerate_hour {
            settings.tolerate_hour = tolerance;
        }
        if let Some(delta) = self.accepted_frame_delta {
            settings.accepted_frame_delta = delta;
        }
        if let Some(diff) = self.accepted_img_hash_diff {
            settings.accepted_img_hash_diff = diff;
        }
    }
}

fn parse_tolerance(value: &str) -> std::result::Result<HourTolerance, String> {
    match value.trim() {
        "true" => return Ok(HourTolerance::symmetric(1)),
        "false" => return Ok(HourTolerance::Exact),
        _ => {}
    }
    let hours = |s: &str| {
        s.trim()
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not a whole number of hours", s.trim()))
    };
    match value.split_once(',') {
        Some((low, high)) => Ok(HourTolerance::asymmetric(hours(low)?, hours(high)?)),
        None => Ok(HourTolerance::symmetric(hours(value)?)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (affected paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    duplicate_file_matcher::init_tracing(&cli.log_level);

    let mut settings = match &cli.settings {
        Some(path) => MatchSettings::from_json_file(path)?,
        None => MatchSettings::default(),
    };
    cli.matching.apply(&mut settings);
    // configuration errors stop the run before any scan
    let config = settings.validate()?;

    let mode = if cli.execute {
        ExecutionMode::Execute
    } else if cli.inspect {
        ExecutionMode::Inspect
    } else {
        ExecutionMode::DryRun
    };

    let term = Term::stderr();
    if cli.output == OutputFormat::Pretty {
        term.write_line(&format!(
            "{} {}",
            style("Duplicate File Matcher").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line(&style(config.describe()).dim().to_string()).ok();
        term.write_line("").ok();
    }

    // created before scanning so a clash aborts without side effects
    let log = cli.log_file.as_deref().map(JsonLinesSink::create).transpose()?;

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!("Ctrl-C will abort instead of pausing: {}", e);
    }

    let mut builder = RunCoordinator::builder(config)
        .backend(Arc::new(FileMediaBackend::new().with_ffprobe(cli.ffprobe.clone())))
        .mode(mode)
        .cancellation(cancellation)
        .skip(cli.skip)
        .include_hidden(cli.include_hidden);
    if let Some(suffixes) = cli.suffixes.clone() {
        builder = builder.suffixes(suffixes);
    }
    let coordinator = builder.build();

    let (sender, receiver) = EventChannel::new();

    let progress = (cli.output == OutputFormat::Pretty).then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    });

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // drain so the channel never fills
            for _ in receiver.iter() {}
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Run(RunEvent::PhaseChanged { phase }) => pb.set_message(phase.to_string()),
                Event::Scan(ScanEvent::Completed { root, total_files }) if verbose => {
                    pb.println(format!("{} files in {}", total_files, display_path(&root)));
                }
                Event::Scan(ScanEvent::Error { path, message }) if verbose => {
                    pb.println(format!("{} {}: {}", style("!").yellow(), display_path(&path), message));
                }
                Event::Descriptor(DescriptorEvent::Started { total }) => {
                    pb.set_length(total as u64);
                    pb.set_position(0);
                }
                Event::Descriptor(DescriptorEvent::Progress(p)) => pb.set_position(p.completed as u64),
                Event::Match(MatchEvent::Started { total_work_files }) => {
                    pb.set_length(total_work_files as u64);
                    pb.set_position(0);
                }
                Event::Match(MatchEvent::Progress(p)) => {
                    pb.set_position(p.processed as u64);
                    pb.set_message(format!(
                        "{} affected ({})",
                        p.affectable,
                        format_bytes(p.affected_bytes)
                    ));
                }
                Event::Run(RunEvent::Completed { .. }) | Event::Run(RunEvent::Cancelled { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let mut sink = TeeSink::new(VecSink::new(), log);
    let mut emitter = ShellEmitter::default();
    let result = coordinator.run_with(
        &cli.work_dir,
        &cli.original_dir,
        &mut sink,
        &mut emitter,
        &sender,
    );

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    if let Some(log) = sink.second {
        if let Err(e) = log.finish() {
            tracing::warn!("Failed to flush the log file: {}", e);
        }
    }
    let summary = result?;
    let records = sink.first.into_records();

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &records, &emitter.lines, &summary, mode, verbose),
        OutputFormat::Json => print_json_results(&records, &emitter.lines, &summary),
        OutputFormat::Minimal => print_minimal_results(&records),
    }

    Ok(())
}

fn print_pretty_results(
    term: &Term,
    records: &[DecisionRecord],
    commands: &[String],
    summary: &RunSummary,
    mode: ExecutionMode,
    verbose: bool,
) {
    for record in records {
        let headline = match record.classification {
            Classification::Duplicate => style("duplicate").green().bold(),
            Classification::SkippedOnWarning => style("skipped on warning").yellow().bold(),
            Classification::Unique => style("unique").cyan().bold(),
        };
        term.write_line(&format!("{} {}", headline, style(&record.rationale).dim())).ok();

        let notes = SideNotes::of(record);
        term.write_line(&format!(
            "  {} {}  {}",
            style("work").magenta(),
            display_path(&record.work_path),
            style(notes.work.join(", ")).yellow()
        ))
        .ok();
        for original in &record.original_paths {
            term.write_line(&format!(
                "  {} {}  {}",
                style("orig").blue(),
                display_path(original),
                style(notes.original.join(", ")).yellow()
            ))
            .ok();
        }
        for failure in &record.failures {
            term.write_line(&format!("  {} {}", style("✗").red().bold(), failure)).ok();
        }
    }

    if !commands.is_empty() {
        term.write_line("").ok();
        // commands go to stdout so they can be piped into a shell
        for line in commands {
            println!("{}", line);
        }
    }

    term.write_line("").ok();
    let status = if summary.is_cancelled() {
        style("Interrupted").yellow().bold()
    } else {
        style("Done").green().bold()
    };
    term.write_line(&format!(
        "{} {} in {:.1}s",
        status,
        style(format!("({})", mode)).dim(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} originals, {} work files",
        style(summary.originals_scanned).cyan(),
        style(summary.work_files_scanned).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} affectable, {}",
        style(summary.affectable_count).cyan(),
        style(format_bytes(summary.affected_size)).yellow()
    ))
    .ok();
    if summary.warnings_count > 0 {
        term.write_line(&format!("  {} with warnings", style(summary.warnings_count).yellow())).ok();
    }
    if summary.failures > 0 {
        term.write_line(&format!("  {} failed", style(summary.failures).red())).ok();
    }
    if verbose {
        term.write_line(&format!(
            "  {} ignored, {} unavailable, {} unresolved among several candidates, {} scan errors",
            summary.ignored,
            summary.unavailable,
            summary.unresolved_multi_candidate,
            summary.scan_errors
        ))
        .ok();
        term.write_line(&style(format!("  run {}", summary.run_id)).dim().to_string()).ok();
    }
    if let Some(skip) = summary.cancelled {
        term.write_line(&format!("  resume with --skip {}", skip)).ok();
    }

    if mode == ExecutionMode::DryRun && !records.is_empty() {
        term.write_line(&format!(
            "{}",
            style("Nothing was changed. Use --inspect to review the commands or --execute to apply them.").dim()
        ))
        .ok();
    }
}

fn print_json_results(records: &[DecisionRecord], commands: &[String], summary: &RunSummary) {
    let output = serde_json::json!({
        "summary": summary,
        "records": records,
        "commands": commands,
    });

    if let Err(e) = serde_json::to_writer_pretty(std::io::stdout().lock(), &output) {
        tracing::error!("Failed to write JSON output: {}", e);
        return;
    }
    println!();
}

fn print_minimal_results(records: &[DecisionRecord]) {
    for record in records {
        if record.classification == Classification::SkippedOnWarning {
            continue;
        }
        if let Some(path) = record.affected_path() {
            println!("{}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse_tolerance("true"), Ok(HourTolerance::symmetric(1)));
        assert_eq!(parse_tolerance("false"), Ok(HourTolerance::Exact));
        assert_eq!(parse_tolerance("2"), Ok(HourTolerance::symmetric(2)));
        assert_eq!(parse_tolerance("-1,3"), Ok(HourTolerance::asymmetric(-1, 3)));
        assert!(parse_tolerance("soon").is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = MatchSettings {
            casefold: true,
            accepted_img_hash_diff: 4,
            ..Default::default()
        };
        let args = MatchArgs {
            rename: true,
            accepted_img_hash_diff: Some(2),
            ..Default::default()
        };

        args.apply(&mut settings);

        assert!(settings.casefold);
        assert!(settings.rename);
        assert_eq!(settings.accepted_img_hash_diff, 2);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "dupe-match",
            "/w",
            "/o",
            "--media-magic",
            "--tolerate-hour",
            "-1,2",
            "--suffixes",
            "jpg,png",
            "--inspect",
        ])
        .unwrap();

        assert!(cli.matching.media_magic);
        assert_eq!(cli.matching.tolerate_hour, Some(HourTolerance::asymmetric(-1, 2)));
        assert_eq!(cli.suffixes, Some(vec!["jpg".to_string(), "png".to_string()]));
        assert!(cli.inspect);
    }

    #[test]
    fn test_log_file_is_optional() {
        let cli = Cli::try_parse_from(["dupe-match", "/w", "/o"]).unwrap();
        assert!(cli.log_file.is_none());

        let cli = Cli::try_parse_from(["dupe-match", "/w", "/o", "--log-file", "changes.jsonl"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("changes.jsonl")));
    }

    #[test]
    fn test_execute_conflicts_with_inspect() {
        assert!(Cli::try_parse_from(["dupe-match", "/w", "/o", "--execute", "--inspect"]).is_err());
    }
}
