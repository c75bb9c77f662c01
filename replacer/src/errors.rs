//! Error types for the replace pipeline.
//!
//! Every per-entry and per-file failure is represented here so the engine can
//! collect them without aborting the run. Only cancellation is treated as a
//! stop signal by the walker and workers.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for replace operations
pub type ReplaceResult<T> = Result<T, ReplaceError>;

/// Errors that can occur while walking the tree and rewriting files
#[derive(Error, Debug)]
pub enum ReplaceError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Failed to walk {path}: {source}")]
    WalkError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Worker thread panicked: {0}")]
    WorkerPanic(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReplaceError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn walk_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WalkError {
            path: path.into(),
            source,
        }
    }

    pub fn worker_panic(name: impl Into<String>) -> Self {
        Self::WorkerPanic(name.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an `io::Error` from opening or reading a file to the
    /// path-carrying variant when the kind identifies one.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// True for the one-shot cancellation signal, which halts the walker and
    /// workers instead of being recorded and skipped past.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("test.txt");
        let err = ReplaceError::file_not_found(path);
        assert!(matches!(err, ReplaceError::FileNotFound(_)));

        let err = ReplaceError::permission_denied(path);
        assert!(matches!(err, ReplaceError::PermissionDenied(_)));

        let err = ReplaceError::walk_error(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(matches!(err, ReplaceError::WalkError { .. }));

        assert!(ReplaceError::Cancelled.is_cancelled());
        assert!(!ReplaceError::config_error("bad").is_cancelled());
    }

    #[test]
    fn test_error_messages() {
        let err = ReplaceError::file_not_found("test.txt");
        assert_eq!(err.to_string(), "File not found: test.txt");

        let err = ReplaceError::config_error("Missing required field");
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );

        assert_eq!(ReplaceError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_from_io_kinds() {
        let path = Path::new("missing.txt");

        let err = ReplaceError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ReplaceError::FileNotFound(_)));

        let err = ReplaceError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, ReplaceError::PermissionDenied(_)));

        let err = ReplaceError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert!(matches!(err, ReplaceError::IoError(_)));
    }
}
