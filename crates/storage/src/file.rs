//! Metadata for files discovered by a storage backend.

use crate::path::stem_of;
use std::path::PathBuf;
use time::OffsetDateTime;

/// A regular file found directly inside a listed directory.
///
/// The stem is derived once on construction (file name minus the final
/// extension) since every consumer joins on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path, including the listed directory
    pub path: PathBuf,
    /// File name without its final extension
    pub stem: String,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        let path = path.into();
        Self {
            stem: stem_of(&path),
            path,
            size,
            modified: modified.into(),
        }
    }
}
