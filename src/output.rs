//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the per-file progress lines, the progress bar used in quiet mode and the
//! final run summary.

use crate::report::{FileOutcome, MoveResult, RunSummary, SkipReason};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// How many skipped file names the summary lists.
pub const SKIPPED_PREVIEW: usize = 5;
/// How many errors the summary lists.
pub const ERROR_PREVIEW: usize = 3;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dlsort::output::OutputFormatter;
    /// OutputFormatter::success("Successfully organized 12 files!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for a live run without per-file lines.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the line for one processed file.
    ///
    /// Moves are only printed when `verbose` or `dry_run` is set; skips caused by
    /// the filesystem (permissions, vanished files) and errors always are.
    pub fn file_line(
        index: usize,
        total: usize,
        outcome: &FileOutcome,
        dry_run: bool,
        verbose: bool,
    ) {
        let counter = format!("[{}/{}]", index, total);
        match &outcome.result {
            MoveResult::Moved { .. } => {
                if dry_run {
                    println!(
                        "{} {} Moving: {} → {}/",
                        "[DRY RUN]".yellow(),
                        counter,
                        outcome.file_name,
                        outcome.category
                    );
                } else if verbose {
                    println!(
                        "{} {} Moving: {} → {}/",
                        "✓".green(),
                        counter,
                        outcome.file_name,
                        outcome.category
                    );
                }
            }
            MoveResult::Skipped(reason) => {
                let always = matches!(
                    reason,
                    SkipReason::PermissionDenied | SkipReason::Vanished
                );
                if always || verbose || dry_run {
                    println!(
                        "{} {} Skipped {} - {}",
                        "⚠".yellow(),
                        counter,
                        outcome.file_name,
                        reason
                    );
                }
            }
            MoveResult::Errored(message) => {
                eprintln!(
                    "{} {} Error with {}: {}",
                    "✗".red(),
                    counter,
                    outcome.file_name,
                    message
                );
            }
        }
    }

    /// Prints the final run summary.
    pub fn summary(summary: &RunSummary, verbose: bool) {
        println!("\n{}", "=".repeat(50));
        println!("{}", "SUMMARY".bold());
        println!("{}", "=".repeat(50));

        if summary.dry_run {
            println!("Files that would be moved: {}", summary.moved.to_string().cyan());
        } else {
            println!("Files moved: {}", summary.moved.to_string().green());
        }

        if summary.skipped() > 0 {
            println!("Files skipped: {}", summary.skipped().to_string().yellow());
            if verbose {
                let names: Vec<&str> = summary
                    .skipped_files
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect();
                println!("   └─ {}", skipped_preview(&names, SKIPPED_PREVIEW));
            }
        }

        if summary.errored() > 0 {
            println!("Errors: {}", summary.errored().to_string().red());
            for line in error_preview(&summary.errored_files, ERROR_PREVIEW) {
                println!("   └─ {}", line);
            }
        }

        if summary.dry_run {
            Self::info("\nRun without --dry-run to apply these changes");
        } else if summary.moved > 0 {
            Self::success(&format!(
                "Successfully organized {} {}!",
                summary.moved,
                if summary.moved == 1 { "file" } else { "files" }
            ));
        }
    }
}

/// Comma-joined names, cut after `limit` with a trailing `...`.
pub fn skipped_preview(names: &[&str], limit: usize) -> String {
    let shown = names.iter().take(limit).copied().collect::<Vec<_>>().join(", ");
    if names.len() > limit {
        format!("{}...", shown)
    } else {
        shown
    }
}

/// `name: message` lines for the first `limit` errors, plus a remainder line.
pub fn error_preview(errors: &[(String, String)], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .iter()
        .take(limit)
        .map(|(name, message)| format!("{}: {}", name, message))
        .collect();
    if errors.len() > limit {
        lines.push(format!("... and {} more", errors.len() - limit));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_preview_truncates() {
        let names = ["a", "b", "c", "d", "e", "f"];
        assert_eq!(skipped_preview(&names, 5), "a, b, c, d, e...");
        assert_eq!(skipped_preview(&names[..2], 5), "a, b");
        assert_eq!(skipped_preview(&[], 5), "");
    }

    #[test]
    fn test_error_preview_truncates() {
        let errors: Vec<(String, String)> = (1..=5)
            .map(|i| (format!("f{}.bin", i), "io failure".to_string()))
            .collect();

        let lines = error_preview(&errors, 3);
        assert_eq!(
            lines,
            vec![
                "f1.bin: io failure".to_string(),
                "f2.bin: io failure".to_string(),
                "f3.bin: io failure".to_string(),
                "... and 2 more".to_string(),
            ]
        );
        assert_eq!(error_preview(&errors[..1], 3).len(), 1);
    }
}
