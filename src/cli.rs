//! Command-line interface module for dlsort.
//!
//! This module handles:
//! - Argument definitions (clap)
//! - Configuration loading
//! - Organization orchestration and console reporting

use crate::config::OrganizerConfig;
use crate::error::Result;
use crate::file_organizer::{OrganizeOptions, Organizer};
use crate::output::OutputFormatter;
use crate::report::RunSummary;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Sort a downloads folder into category subfolders by file extension.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "dlsort",
    version,
    about = "Organize a downloads folder by file type",
    after_help = "Example: dlsort --dry-run --verbose"
)]
pub struct Args {
    /// Folder to organize (default: the configured path, else ~/Downloads).
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Preview changes without moving files.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print a line for every file.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Runs the CLI application with parsed arguments.
///
/// Loads the configuration, organizes the target directory and prints the
/// report. Per-file failures are reported but do not make this fail.
///
/// # Examples
///
/// ```no_run
/// use dlsort::cli::{run_cli, Args};
///
/// let args = Args { dry_run: true, ..Default::default() };
/// match run_cli(&args) {
///     Ok(summary) => println!("{} files would move", summary.moved),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<RunSummary> {
    let config = OrganizerConfig::load(args.config.as_deref())?;
    let target = args
        .path
        .clone()
        .unwrap_or_else(|| config.target_path());
    organize_directory(&target, &config, args.dry_run, args.verbose)
}

/// Organizes `target` with `config`, printing progress and the summary.
pub fn organize_directory(
    target: &Path,
    config: &OrganizerConfig,
    dry_run: bool,
    verbose: bool,
) -> Result<RunSummary> {
    let organizer = Organizer::new(config)?;

    OutputFormatter::header("Downloads Organizer");
    OutputFormatter::plain(&format!("Target folder: {}\n", target.display()));
    if dry_run {
        OutputFormatter::dry_run_notice("No files will be moved\n");
    }

    // Per-file lines replace the bar when they are printed anyway.
    let progress = (!dry_run && !verbose).then(|| OutputFormatter::create_progress_bar(0));

    let summary = organizer.organize_with_progress(
        target,
        OrganizeOptions { dry_run },
        |index, total, outcome| {
            if let Some(pb) = &progress {
                pb.set_length(total as u64);
                pb.suspend(|| OutputFormatter::file_line(index, total, outcome, dry_run, verbose));
                pb.inc(1);
            } else {
                OutputFormatter::file_line(index, total, outcome, dry_run, verbose);
            }
        },
    )?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if summary.directory_missing {
        OutputFormatter::error(&format!(
            "Error: Directory {} does not exist.",
            target.display()
        ));
        return Ok(summary);
    }

    if summary.total_processed() == 0 {
        OutputFormatter::info("No files to organize.");
        return Ok(summary);
    }

    OutputFormatter::summary(&summary, verbose);
    Ok(summary)
}
