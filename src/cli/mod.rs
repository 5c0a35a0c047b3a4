//! # CLI Module
//!
//! Command-line interface for the duplicate asset finder.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for duplicates
//! asset-dedup scan ~/Photos
//!
//! # Scan an exported library manifest
//! asset-dedup scan library.json --output json
//!
//! # Use file modification times when photos lack EXIF capture times
//! asset-dedup scan ~/Photos --file-time-fallback
//! ```
//!
//! Ctrl+C stops the scan. Whatever was found so far is still printed.

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use duplicate_asset_finder::core::reporter::{
    asset_label, export_csv, export_json, format_timestamp,
};
use duplicate_asset_finder::core::scanner::{CancelToken, DuplicateScanner, ScanState};
use duplicate_asset_finder::core::source::{load_paths, DirectorySourceConfig};
use duplicate_asset_finder::error::{DuplicateFinderError, Result};
use duplicate_asset_finder::events::{Event, EventChannel, ScanEvent, ScanSummary, SourceEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

/// Exit code after Ctrl+C (128 + SIGINT)
const EXIT_CODE_INTERRUPTED: u8 = 130;

/// Duplicate Asset Finder - flag likely duplicates by capture metadata
#[derive(Parser, Debug)]
#[command(name = "asset-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories or JSON manifests for duplicate assets
    Scan {
        /// Directories or .json asset manifests
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Use file modification time when a photo has no EXIF capture time
        #[arg(long)]
        file_time_fallback: bool,

        /// Maximum directory depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// CSV, one row per asset
    Csv,
    /// Minimal output (duplicates only, one per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            output,
            include_hidden,
            file_time_fallback,
            max_depth,
            verbose,
        } => {
            duplicate_asset_finder::init_tracing(if verbose { "debug" } else { "warn" });

            let config = DirectorySourceConfig {
                include_hidden,
                file_time_fallback,
                max_depth,
                ..Default::default()
            };
            run_scan(&paths, &config, output, verbose)
        }
    }
}

fn run_scan(
    paths: &[PathBuf],
    config: &DirectorySourceConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<ExitCode> {
    let term = Term::stderr();
    let pretty = output == OutputFormat::Pretty;

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Duplicate Asset Finder").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Stopping scan...");
        handler_token.cancel();
    })
    .map_err(|e| DuplicateFinderError::Config(format!("cannot install Ctrl+C handler: {e}")))?;

    let (sender, receiver) = EventChannel::new();
    let progress = if pretty {
        Some(progress_bar()?)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        let mut summary: Option<ScanSummary> = None;

        for event in receiver.iter() {
            match event {
                Event::Source(SourceEvent::Skipped { path, message }) if verbose => {
                    let line = format!("  skipped {}: {}", path.display(), message);
                    match progress_clone {
                        Some(ref pb) => pb.println(line),
                        None => eprintln!("{line}"),
                    }
                }
                Event::Scan(ScanEvent::Started { total_assets }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_assets as u64);
                        pb.set_message("Comparing");
                    }
                }
                Event::Scan(ScanEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.processed as u64);
                        pb.set_message(format!("{} duplicate groups", p.groups_found));
                    }
                }
                Event::Scan(ScanEvent::Completed { summary: s })
                | Event::Scan(ScanEvent::Cancelled { summary: s }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                    summary = Some(s);
                }
                _ => {}
            }
        }

        summary
    });

    if let Some(ref pb) = progress {
        pb.set_message("Reading metadata");
    }
    // Ctrl+C during enumeration stops reading files; the scan then ends at once
    let assets = load_paths(paths, config, &cancel, &sender)?;

    let interrupted = cancel.clone();
    let handle = DuplicateScanner::new().spawn(assets, cancel, sender);
    let state = handle.join()?;

    // The scan thread owned the last sender, so the event thread ends here
    let summary = event_thread
        .join()
        .ok()
        .flatten()
        .unwrap_or_else(|| state.summary(0));

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &state, &summary, verbose),
        OutputFormat::Json => export_json(&state, &summary, io::stdout().lock())?,
        OutputFormat::Csv => export_csv(&state, io::stdout().lock())?,
        OutputFormat::Minimal => print_minimal_results(&state),
    }

    // An interrupt during enumeration can leave nothing to scan
    if state.cancelled || interrupted.is_cancelled() {
        Ok(ExitCode::from(EXIT_CODE_INTERRUPTED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map_err(|e| DuplicateFinderError::Config(e.to_string()))?
        .progress_chars("█▓░");

    let pb = ProgressBar::new(0);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn print_pretty_results(term: &Term, state: &ScanState, summary: &ScanSummary, verbose: bool) {
    term.write_line("").ok();
    if state.cancelled {
        term.write_line(&format!(
            "{} Scan stopped after {} of {} assets (partial results)",
            style("■").yellow().bold(),
            summary.processed_assets,
            summary.total_assets
        ))
        .ok();
    } else {
        term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
            .ok();
    }
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} assets compared in {:.1}s",
        style(summary.processed_assets).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups found",
        style(summary.duplicate_groups).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} likely duplicates",
        style(summary.duplicate_count).cyan()
    ))
    .ok();
    term.write_line("").ok();

    if state.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("✓").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in state.groups.iter().enumerate() {
            let rep = &group.representative;
            term.write_line(&format!(
                "  {} {} · {} · {} ({} duplicates)",
                style(format!("Group {}:", i + 1)).bold(),
                style(format_timestamp(rep.creation_timestamp)).yellow(),
                rep.media_variant_flags,
                rep.dimensions_display(),
                group.duplicate_count()
            ))
            .ok();

            term.write_line(&format!(
                "    {} {}",
                style("★").green(),
                display_label(asset_label(rep))
            ))
            .ok();
            for member in &group.members {
                term.write_line(&format!(
                    "    {} {}",
                    style("○").dim(),
                    display_label(asset_label(member))
                ))
                .ok();
            }

            if verbose {
                term.write_line(&format!(
                    "    {}",
                    style("★ first seen, ○ same capture time, variant and size").dim()
                ))
                .ok();
            }

            term.write_line("").ok();
        }
    }

    term.write_line(&format!(
        "{}",
        style("Remember: No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_minimal_results(state: &ScanState) {
    for group in &state.groups {
        for member in &group.members {
            println!("{}", asset_label(member));
        }
    }
}

/// Shorten paths under the home directory to `~/...`
fn display_label(label: &str) -> String {
    let Some(home) = dirs::home_dir() else {
        return label.to_string();
    };

    match PathBuf::from(label).strip_prefix(&home) {
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => label.to_string(),
    }
}
