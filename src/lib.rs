//! dlsort - sort a downloads folder by file type
//!
//! This library classifies files by extension against a configurable category
//! table, moves them into matching subfolders with collision-safe names, and
//! reports per-file outcomes. A dry-run mode computes the same plan without
//! touching the filesystem.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod report;

pub use config::{CompiledFilters, OrganizerConfig};
pub use error::{ConfigError, Error, FileError, Result};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{FileOrganizer, OrganizeOptions, Organizer};
pub use report::{FileOutcome, MoveResult, RunSummary, SkipReason};

pub use cli::{Args, run_cli};
