//! Local filesystem storage backend.
//!
//! This module provides a storage backend implementation for the local
//! filesystem, accessed via `tokio::fs` for async I/O.

use crate::backend::FileEntryStream;
use crate::error::{ErrorKind, Result};
use crate::{FileEntry, StorageBackend};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use filetime::FileTime;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum ListEntry {
    File(FileEntry),
    Skip,
}

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use restem_storage::backend::{LocalBackend, StorageBackend};
/// use std::path::Path;
///
/// # async fn example() -> restem_storage::error::Result<()> {
/// let backend = LocalBackend::new("local");
/// backend.copy(Path::new("/in/a.txt"), Path::new("/out/renamed_a.txt")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn entry(path: PathBuf, metadata: Metadata) -> Result<FileEntry> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(FileEntry::new(path, metadata.len(), modified))
    }

    /// Keeps the listing loop free of error plumbing: everything that can go
    /// wrong with a single entry is converted here, and the loop only has to
    /// yield it.
    async fn process_entry(&self, entry: DirEntry) -> Result<ListEntry> {
        let path = entry.path();
        // `fs::metadata` follows symlinks, `DirEntry::metadata` doesn't.
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            // Silently drop what is most likely a broken symlink.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ListEntry::Skip),
            Err(e) => exn::bail!(ErrorKind::from_io(e, &path)),
        };
        if !metadata.is_file() {
            return Ok(ListEntry::Skip);
        }
        Ok(ListEntry::File(Self::entry(path, metadata)?))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, dir: &'a Path) -> FileEntryStream<'a> {
        Box::pin(stream! {
            let mut entries = match fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(e, dir)));
                    return;
                }
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => { yield Err(exn::Exn::from(ErrorKind::from_io(e, dir))); continue; },
                };
                match self.process_entry(entry).await {
                    Ok(ListEntry::File(f)) => yield Ok(f),
                    Ok(ListEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        })
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => exn::bail!(ErrorKind::from_io(e, path)),
        }
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => exn::bail!(ErrorKind::from_io(e, path)),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let metadata = fs::metadata(from).await.map_err(|e| ErrorKind::from_io(e, from))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotAFile(from.to_path_buf()));
        }
        // Copies contents and permission bits.
        let bytes = fs::copy(from, to).await.map_err(|e| ErrorKind::from_io(e, to))?;
        let accessed = FileTime::from_last_access_time(&metadata);
        let modified = FileTime::from_last_modification_time(&metadata);
        let target = to.to_path_buf();
        tokio::task::spawn_blocking(move || filetime::set_file_times(&target, accessed, modified))
            .await
            .or_raise(|| ErrorKind::BackendError("timestamp task did not complete".to_string()))?
            .map_err(|e| ErrorKind::from_io(e, to))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn test_list_only_direct_regular_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "a.txt", b"a");
        write(temp_dir.path(), "b.txt", b"b");
        write(temp_dir.path(), "README", b"readme");
        std::fs::create_dir(temp_dir.path().join("nested.d")).unwrap();
        write(&temp_dir.path().join("nested.d"), "c.txt", b"c");
        let backend = LocalBackend::new("local");
        let mut stems: Vec<_> = backend.list(temp_dir.path()).await.unwrap().into_iter().map(|f| f.stem).collect();
        stems.sort();
        assert_eq!(stems, vec!["README", "a", "b"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_follows_symlinks_and_drops_broken_ones() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = write(temp_dir.path(), "real.txt", b"data");
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link.txt")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("missing"), temp_dir.path().join("broken.txt")).unwrap();
        let backend = LocalBackend::new("local");
        let mut stems: Vec<_> = backend.list(temp_dir.path()).await.unwrap().into_iter().map(|f| f.stem).collect();
        stems.sort();
        assert_eq!(stems, vec!["link", "real"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("local");
        let err = backend.list(&temp_dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_is_dir_and_is_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = write(temp_dir.path(), "file.txt", b"data");
        let backend = LocalBackend::new("local");
        assert!(backend.is_dir(temp_dir.path()).await.unwrap());
        assert!(!backend.is_file(temp_dir.path()).await.unwrap());
        assert!(backend.is_file(&file).await.unwrap());
        assert!(!backend.is_dir(&file).await.unwrap());
        assert!(!backend.is_file(&temp_dir.path().join("nonexistent")).await.unwrap());
        assert!(!backend.is_dir(&temp_dir.path().join("nonexistent")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_dir_all_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        let backend = LocalBackend::new("local");
        backend.create_dir_all(&nested).await.unwrap();
        backend.create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_copy_preserves_contents_and_mtime() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = write(temp_dir.path(), "a.txt", b"Hello, world!");
        let past = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(86_400));
        filetime::set_file_mtime(&source, past).unwrap();
        let target = temp_dir.path().join("renamed_a.txt");
        let backend = LocalBackend::new("local");
        let bytes = backend.copy(&source, &target).await.unwrap();
        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&target).unwrap(), b"Hello, world!");
        let copied = FileTime::from_last_modification_time(&std::fs::metadata(&target).unwrap());
        assert_eq!(copied.unix_seconds(), past.unix_seconds());
    }

    #[tokio::test]
    async fn test_copy_overwrites_existing_target() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = write(temp_dir.path(), "a.txt", b"new");
        let target = write(temp_dir.path(), "b.txt", b"old contents");
        let backend = LocalBackend::new("local");
        backend.copy(&source, &target).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_copy_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("local");
        let missing = backend.copy(&temp_dir.path().join("missing.txt"), &temp_dir.path().join("x.txt")).await;
        assert!(matches!(&*missing.unwrap_err(), ErrorKind::NotFound(_)));
        let dir = backend.copy(temp_dir.path(), &temp_dir.path().join("x.txt")).await;
        assert!(matches!(&*dir.unwrap_err(), ErrorKind::NotAFile(_)));
        let source = write(temp_dir.path(), "a.txt", b"data");
        let no_parent = backend.copy(&source, &temp_dir.path().join("no/such/dir/a.txt")).await;
        assert!(matches!(&*no_parent.unwrap_err(), ErrorKind::NotFound(_)));
    }
}
