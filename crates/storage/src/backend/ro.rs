//! Readonly storage backend.
//!
//! This module provides a storage backend implementation that wraps other
//! implementations and prevents write operations from executing, but
//! indicating success on return.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{ErrorKind, Result};
use crate::{BackendHandle, StorageBackend, backend::FileEntryStream};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event) for each one. Used for dry runs: the copy
/// still checks that its source is a regular file, so a dry run reports the
/// same per-job failures a real run would for missing sources.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self, dir: &'a Path) -> FileEntryStream<'a> {
        self.inner.list_stream(dir)
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        self.inner.is_dir(path).await
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        self.inner.is_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tracing::info!(backend = self.name(), path = %path.display(), "Read-only: skipping directory creation");
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        if !self.inner.is_file(from).await? {
            exn::bail!(ErrorKind::NotAFile(from.to_path_buf()));
        }
        tracing::info!(backend = self.name(), from = %from.display(), to = %to.display(), "Read-only: skipping copy");
        Ok(0)
    }
}
