//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything here is raised before any work starts; none of it is
/// retryable without the user changing something.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested config file does not exist.
    #[display("config file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The config file extension is not one of toml, yaml, yml or json.
    #[display("unsupported config file format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// Merging the configuration sources failed (bad syntax or types).
    #[display("could not load configuration")]
    Load,
    /// A required setting has no value from any source.
    #[display("missing required setting `{_0}`")]
    Missing(#[error(not(source))] &'static str),
    /// The delimiter is not a single ASCII character.
    #[display("delimiter must be a single ASCII character, got {_0:?}")]
    InvalidDelimiter(#[error(not(source))] char),
    #[display("concurrency must be at least 1")]
    InvalidConcurrency,
    /// The current directory could not be determined.
    #[display("could not determine the working directory")]
    WorkingDirectory,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Missing("input_csv").to_string(), "missing required setting `input_csv`");
        assert_eq!(
            ErrorKind::InvalidDelimiter('é').to_string(),
            "delimiter must be a single ASCII character, got 'é'"
        );
    }
}
