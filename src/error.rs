//! Error types for dlsort.
//!
//! Top-level failures (bad configuration, a target path that is not a
//! directory) are reported through [`Error`]. Failures while handling a single
//! file are captured as [`FileError`] and never abort a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an organization run before any file is touched.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid target path: {0}")]
    InvalidPath(String),

    #[error("Target is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Error reading directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Errors that can occur during configuration loading and filter compilation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(#[from] toml::de::Error),

    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),

    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    Io(#[from] io::Error),
}

/// Failure while relocating a single file.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("permission denied")]
    PermissionDenied(#[source] io::Error),

    #[error("file disappeared during processing")]
    Vanished(#[source] io::Error),

    #[error("{0}")]
    Other(#[source] io::Error),
}

impl FileError {
    /// Classifies an IO error by its kind.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(err),
            io::ErrorKind::NotFound => Self::Vanished(err),
            _ => Self::Other(err),
        }
    }
}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        Self::from_io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_classification() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            FileError::from_io(denied),
            FileError::PermissionDenied(_)
        ));

        let gone = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(FileError::from_io(gone), FileError::Vanished(_)));

        let other = io::Error::other("disk on fire");
        let err = FileError::from_io(other);
        assert!(matches!(err, FileError::Other(_)));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_not_a_directory_message() {
        let err = Error::NotADirectory(PathBuf::from("/tmp/file.txt"));
        assert_eq!(err.to_string(), "Target is not a directory: /tmp/file.txt");
    }
}
