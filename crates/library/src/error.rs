//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies which phase of a run failed.
///
/// ### Soft failures
/// The pipeline logs these and carries on with nothing to do:
/// - [`ErrorKind::NotADirectory`]
/// - [`ErrorKind::Mapping`] wrapping a missing or empty mapping file
///
/// ### Hard failures
/// - [`ErrorKind::Index`]
/// - [`ErrorKind::Mapping`] for anything else
/// - [`ErrorKind::Plan`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The input folder does not exist or is not a directory.
    #[display("input folder is not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// The input folder could not be listed.
    #[display("could not index input folder")]
    Index,
    /// The mapping file could not be read.
    #[display("could not read mapping file")]
    Mapping,
    /// The copy plan could not be prepared (e.g. the output folder could not
    /// be created).
    #[display("could not prepare copy plan")]
    Plan,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
