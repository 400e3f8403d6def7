use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use restem_storage::{FileEntry, StorageBackend};
use std::collections::HashMap;
use std::path::Path;
use tracing::instrument;

/// Regular files of the input folder keyed by stem.
#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    files: HashMap<String, FileEntry>,
}
impl FolderIndex {
    /// Insert an entry under its stem, returning the entry it replaced.
    pub fn insert(&mut self, entry: FileEntry) -> Option<FileEntry> {
        self.files.insert(entry.stem.clone(), entry)
    }

    pub fn get(&self, stem: &str) -> Option<&FileEntry> {
        self.files.get(stem)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Index the regular files directly inside `dir` by stem.
///
/// Two files sharing a stem (`photo.jpg` and `photo.png`) collide: the one
/// listed later wins and a warning is logged. Listing order is up to the
/// backend, so which one that is is not defined. Entries that cannot be read
/// are logged and skipped.
///
/// # Errors
/// - [`NotADirectory`](ErrorKind::NotADirectory) if `dir` is not a directory,
/// - [`Index`](ErrorKind::Index) if the backend cannot tell.
#[instrument(skip(backend), fields(backend = backend.name(), dir = %dir.display()))]
pub async fn index_folder(backend: &dyn StorageBackend, dir: &Path) -> Result<FolderIndex> {
    if !backend.is_dir(dir).await.or_raise(|| ErrorKind::Index)? {
        exn::bail!(ErrorKind::NotADirectory(dir.to_path_buf()));
    }
    let mut index = FolderIndex::default();
    let mut entries = backend.list_stream(dir);
    while let Some(entry) = entries.next().await {
        match entry {
            Ok(entry) => {
                let path = entry.path.clone();
                if let Some(previous) = index.insert(entry) {
                    tracing::warn!(
                        stem = %previous.stem,
                        kept = %path.display(),
                        dropped = %previous.path.display(),
                        "Duplicate stem in input folder"
                    );
                }
            },
            Err(e) => tracing::warn!(error = %&*e, "Skipping unreadable entry"),
        }
    }
    tracing::debug!(files = index.len(), "Indexed input folder");
    Ok(index)
}
