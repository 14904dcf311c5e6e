/// Per-file outcomes and the aggregated run summary.
///
/// Every file considered by a run ends in exactly one [`MoveResult`]. The
/// [`RunSummary`] folds those results into counters plus the names needed for
/// the final report.
use std::fmt;
use std::path::PathBuf;

/// Why a file was left where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A regular file occupies the path of the category folder.
    CategoryConflict { category: String },
    /// The file already sits inside a category folder.
    AlreadyOrganized,
    /// The move was refused by the operating system.
    PermissionDenied,
    /// The file was deleted or moved by someone else after the listing.
    Vanished,
    /// The file exceeds the configured size limit.
    TooLarge { size_mb: u64, limit_mb: u64 },
    /// The file was modified more recently than the configured minimum age.
    TooRecent { age_days: i64, min_days: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryConflict { category } => {
                write!(f, "{} exists as a file, not a folder", category)
            }
            Self::AlreadyOrganized => write!(f, "already organized"),
            Self::PermissionDenied => write!(f, "file is in use or permission denied"),
            Self::Vanished => write!(f, "file disappeared during processing"),
            Self::TooLarge { size_mb, limit_mb } => {
                write!(f, "{} MB exceeds the {} MB limit", size_mb, limit_mb)
            }
            Self::TooRecent { age_days, min_days } => {
                write!(f, "{} days old, younger than {} days", age_days, min_days)
            }
        }
    }
}

/// Outcome of attempting to relocate one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// The file was moved (or, in a dry run, would be moved) to `destination`.
    Moved { destination: PathBuf },
    Skipped(SkipReason),
    Errored(String),
}

/// One processed file together with its outcome.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file_name: String,
    pub source: PathBuf,
    pub category: String,
    pub result: MoveResult,
}

/// Aggregated result of an organization run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files moved, or in a dry run, files that would be moved.
    pub moved: usize,
    /// Names of skipped files with the reason.
    pub skipped_files: Vec<(String, SkipReason)>,
    /// Names of files that failed with the error message.
    pub errored_files: Vec<(String, String)>,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Set when the target directory did not exist. All counters stay at zero.
    pub directory_missing: bool,
}

impl RunSummary {
    /// Creates an empty summary.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// The summary of a run whose target directory does not exist.
    pub fn directory_not_found(dry_run: bool) -> Self {
        Self {
            dry_run,
            directory_missing: true,
            ..Default::default()
        }
    }

    /// Folds one file outcome into the counters.
    pub fn record(&mut self, outcome: &FileOutcome) {
        match &outcome.result {
            MoveResult::Moved { .. } => self.moved += 1,
            MoveResult::Skipped(reason) => self
                .skipped_files
                .push((outcome.file_name.clone(), reason.clone())),
            MoveResult::Errored(message) => self
                .errored_files
                .push((outcome.file_name.clone(), message.clone())),
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_files.len()
    }

    pub fn errored(&self) -> usize {
        self.errored_files.len()
    }

    /// Returns the total number of files processed.
    pub fn total_processed(&self) -> usize {
        self.moved + self.skipped() + self.errored()
    }

    /// Returns true if no file was skipped or errored.
    pub fn is_complete_success(&self) -> bool {
        self.skipped_files.is_empty() && self.errored_files.is_empty()
    }
}
