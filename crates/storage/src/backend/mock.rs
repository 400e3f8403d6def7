//! In-memory storage backend for testing.

use super::FileEntryStream;
use crate::error::{ErrorKind, Result};
use crate::file::FileEntry;
use crate::StorageBackend;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use time::UtcDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files and directories are stored behind [`RwLock`]s, so all trait methods
/// can operate on `&self` without external synchronisation. On top of plain
/// storage it can inject copy failures for chosen source paths, slow copies
/// down, and records the highest number of copies that were running at the
/// same time.
///
/// # Examples
///
/// ```
/// use restem_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("/in/a.txt", b"data")]).with_dirs(["/out"]);
/// backend.copy(Path::new("/in/a.txt"), Path::new("/out/b.txt")).await?;
/// assert_eq!(backend.contents("/out/b.txt").await.unwrap(), b"data");
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    files: RwLock<HashMap<PathBuf, (UtcDateTime, Vec<u8>)>>,
    dirs: RwLock<HashSet<PathBuf>>,
    failing: HashSet<PathBuf>,
    unstattable: HashSet<PathBuf>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files. Parent directories of
    /// every file are created implicitly.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = UtcDateTime::now();
        let mut map = HashMap::new();
        let mut dirs = HashSet::new();
        for (path, data) in files {
            let path = path.into();
            dirs.extend(path.ancestors().skip(1).map(Path::to_path_buf));
            map.insert(path, (now, data.into()));
        }
        Self {
            name: "mock".to_string(),
            files: RwLock::new(map),
            dirs: RwLock::new(dirs),
            failing: HashSet::new(),
            unstattable: HashSet::new(),
            delay: None,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Add (empty) directories.
    pub fn with_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let set = self.dirs.get_mut();
        for dir in dirs {
            let dir = dir.into();
            set.extend(dir.ancestors().map(Path::to_path_buf));
        }
        self
    }

    /// Copies *from* any of these paths fail with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn with_failing(mut self, sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.failing.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Checking what any of these paths is fails with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn with_unstattable(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.unstattable.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Every copy sleeps this long before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Contents of a stored file.
    pub async fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.read().await.get(path.as_ref()).map(|(_, data)| data.clone())
    }

    /// Remove a file, e.g. to simulate it disappearing between listing and copying.
    pub async fn remove(&self, path: impl AsRef<Path>) {
        self.files.write().await.remove(path.as_ref());
    }

    /// Highest number of copies observed running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn copy_inner(&self, from: &Path, to: &Path) -> Result<u64> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(from) {
            exn::bail!(ErrorKind::PermissionDenied(from.to_path_buf()));
        }
        let (modified, data) =
            self.files.read().await.get(from).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(from.to_path_buf())))?;
        let parent_exists = match to.parent() {
            Some(parent) => self.dirs.read().await.contains(parent),
            None => false,
        };
        if !parent_exists {
            exn::bail!(ErrorKind::NotFound(to.to_path_buf()));
        }
        let size = data.len() as u64;
        self.files.write().await.insert(to.to_path_buf(), (modified, data));
        Ok(size)
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, dir: &'a Path) -> FileEntryStream<'a> {
        Box::pin(stream! {
            if !self.dirs.read().await.contains(dir) {
                yield Err(exn::Exn::from(ErrorKind::NotFound(dir.to_path_buf())));
                return;
            }
            // Snapshot matching entries under the read lock, then drop it
            // before yielding to avoid holding the lock across yield points.
            let entries: Vec<FileEntry> = {
                let guard = self.files.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| path.parent() == Some(dir))
                    .map(|(path, (modified, data))| FileEntry::new(path.clone(), data.len() as u64, *modified))
                    .collect()
            };
            for entry in entries {
                yield Ok(entry);
            }
        })
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        Ok(self.dirs.read().await.contains(path))
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        if self.unstattable.contains(path) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        Ok(self.files.read().await.contains_key(path))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.files.read().await.contains_key(path) {
            exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
        }
        self.dirs.write().await.extend(path.ancestors().map(Path::to_path_buf));
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        let result = self.copy_inner(from, to).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_is_not_recursive() {
        let backend = MockBackend::with_files([("/in/a.txt", "a"), ("/in/b.txt", "b"), ("/in/sub/c.txt", "c")]);
        let mut stems: Vec<_> =
            backend.list(Path::new("/in")).await.unwrap().into_iter().map(|f| f.stem).collect();
        stems.sort();
        assert_eq!(stems, vec!["a", "b"]);
        assert!(backend.is_dir(Path::new("/in/sub")).await.unwrap());
        assert!(backend.list(Path::new("/missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_copy() {
        let backend = MockBackend::with_files([("/in/a.txt", "a")]).with_dirs(["/out"]).with_failing(["/in/a.txt"]);
        let err = backend.copy(Path::new("/in/a.txt"), Path::new("/out/a.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        assert!(backend.contents("/out/a.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_unstattable_path() {
        let backend = MockBackend::with_files([("/in/a.txt", "a"), ("/in/b.txt", "b")]).with_unstattable(["/in/a.txt"]);
        let err = backend.is_file(Path::new("/in/a.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        assert!(backend.is_file(Path::new("/in/b.txt")).await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_requires_parent_directory() {
        let backend = MockBackend::with_files([("/in/a.txt", "a")]);
        assert!(backend.copy(Path::new("/in/a.txt"), Path::new("/out/a.txt")).await.is_err());
        backend.create_dir_all(Path::new("/out")).await.unwrap();
        assert_eq!(backend.copy(Path::new("/in/a.txt"), Path::new("/out/a.txt")).await.unwrap(), 1);
        assert_eq!(backend.peak_concurrency(), 1);
    }
}
