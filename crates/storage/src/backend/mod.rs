//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides the handful
//! of filesystem operations the rename pipeline needs: listing a directory,
//! checking what a path is, creating the output directory and copying files.
//! Keeping them behind a trait lets the pipeline run for real
//! ([`LocalBackend`]), as a dry run ([`ReadOnlyBackend`]), or entirely in
//! memory for tests (`MockBackend`).

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::file::FileEntry;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub(crate) type FileEntryStream<'a> = Pin<Box<dyn Stream<Item = Result<FileEntry>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// All operations are asynchronous and take full paths (there is no storage
/// root: input and output directories are independent of each other).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use restem_storage::{backend::StorageBackend, error::Result};
///
/// async fn copy_if_present(backend: &dyn StorageBackend, from: &Path, to: &Path) -> Result<u64> {
///     if backend.is_file(from).await? {
///         backend.copy(from, to).await
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List the regular files directly inside `dir`.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`list_stream()`](Self::list_stream) into a [`Vec`] before
    /// returning.
    async fn list(&self, dir: &Path) -> Result<Vec<FileEntry>> {
        self.list_stream(dir).try_collect().await
    }

    /// Stream the regular files directly inside `dir`.
    ///
    /// Listing is **not** recursive: subdirectories, and anything else that
    /// is not a regular file once symlinks are followed, are skipped. Entry
    /// order is whatever the backend produces and must not be relied upon.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use restem_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Path::new("/data/in"));
    /// while let Some(entry) = stream.try_next().await? {
    ///     println!("{}: {} bytes", entry.stem, entry.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, dir: &'a Path) -> FileEntryStream<'a>;

    /// Whether `path` currently is a directory (following symlinks).
    async fn is_dir(&self, path: &Path) -> Result<bool>;

    /// Whether `path` currently is a regular file (following symlinks).
    async fn is_file(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all of its missing parents. Succeeds if the
    /// directory already exists.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy the file at `from` to `to`, overwriting `to` if it exists.
    ///
    /// Implementations should preserve permissions and access/modification
    /// times. Returns the number of bytes copied.
    async fn copy(&self, from: &Path, to: &Path) -> Result<u64>;
}
