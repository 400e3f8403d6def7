use crate::plan::CopyJob;
use restem_storage::BackendHandle;
use restem_storage::error::Error as StorageError;
use std::path::PathBuf;

/// A job that finished successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Copied {
    pub key: String,
    pub stem: String,
    pub destination: PathBuf,
    pub bytes: u64,
}

/// A job that failed, with the storage error that caused it.
#[derive(Debug)]
pub struct Failed {
    pub key: String,
    pub source: PathBuf,
    pub error: StorageError,
}

pub type CopyOutcome = std::result::Result<Copied, Failed>;

pub(crate) async fn copy_job(backend: BackendHandle, job: CopyJob) -> CopyOutcome {
    let CopyJob { key, source, destination, stem } = job;
    match backend.copy(&source, &destination).await {
        Ok(bytes) => {
            tracing::debug!(from = %source.display(), to = %destination.display(), bytes, "Copied");
            Ok(Copied { key, stem, destination, bytes })
        },
        Err(error) => {
            tracing::error!(key = %key, from = %source.display(), error = %&*error, "Copy failed");
            Err(Failed { key, source, error })
        },
    }
}
