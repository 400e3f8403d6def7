//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File or directory does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// A directory was required but something else (or nothing) was found
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// A regular file was required but something else was found
    #[display("not a regular file: {}", _0.display())]
    NotAFile(#[error(not(source))] PathBuf),
    /// A file stem is empty, or would escape the directory it is placed in
    #[display("invalid file stem: {_0:?}")]
    InvalidStem(#[error(not(source))] String),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BackendError(_))
    }

    /// Classify an I/O error against the path it happened on.
    pub fn from_io(err: IoError, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotFound(PathBuf::from("a/b.txt")).to_string(), "file not found: a/b.txt");
        assert_eq!(ErrorKind::InvalidStem("..".to_string()).to_string(), "invalid file stem: \"..\"");
    }

    #[test]
    fn from_io_classifies_kind() {
        let err = ErrorKind::from_io(IoError::new(IoErrorKind::NotFound, "gone"), "x");
        assert!(matches!(err, ErrorKind::NotFound(p) if p == PathBuf::from("x")));
        let err = ErrorKind::from_io(IoError::new(IoErrorKind::PermissionDenied, "nope"), "y");
        assert!(matches!(err, ErrorKind::PermissionDenied(_)));
        let err = ErrorKind::from_io(IoError::other("disk full"), "z");
        assert!(matches!(err, ErrorKind::Io(_)));
        assert!(err.is_retryable());
    }
}
