//! Mapping Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A mapping error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The mapping file does not exist or is not a regular file.
    #[display("mapping file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The mapping file has no non-empty row to use as a header.
    #[display("mapping file is empty: {}", _0.display())]
    Empty(#[error(not(source))] PathBuf),
    /// The file could not be opened or read.
    #[display("could not read mapping file: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The delimited data is malformed (for example, it is not valid UTF-8).
    #[display("malformed mapping data on line {line}")]
    Parse {
        /// 1-based line the parser stopped at.
        line: u64,
    },
    /// A row is shorter than a requested field index.
    #[display("field index {index} out of range for a row with {fields} fields")]
    FieldOutOfRange {
        /// Zero-based field index that was requested.
        index: usize,
        /// Number of fields the row actually has.
        fields: usize,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The file is either well-formed or it isn't; only reading it can fail
        // transiently.
        matches!(self, Self::Io(_))
    }
}
