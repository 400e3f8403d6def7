use crate::error::{ErrorKind, Result};
use crate::index::FolderIndex;
use exn::ResultExt;
use restem_mapping::Mapping;
use restem_storage::{StorageBackend, key_from_field, with_stem};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// A single copy to perform: `source` into `destination`, renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    /// Mapping key (the source stem) this job was planned from.
    pub key: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Stem of `destination`.
    pub stem: String,
}

/// Join the folder index with the mapping into copy jobs.
///
/// Jobs come out in mapping order. For every record:
/// - no indexed file with that stem: skipped (debug log),
/// - the file is no longer a regular file: skipped (trace log),
/// - the file cannot be inspected: skipped (error log),
/// - no field at `destination_index`, or a field without a usable stem:
///   skipped (error log),
/// - otherwise a job copying the file into `output`. The new stem is the
///   destination field without directories or final extension; the source
///   extension is kept, so `a.txt` with `renamed.jpg` becomes `renamed.txt`.
///
/// `output` is created (with parents) unless the mapping has no records.
///
/// # Errors
/// [`Plan`](ErrorKind::Plan) if the output folder cannot be created.
#[instrument(skip_all, fields(output = %output.display(), destination_index = destination_index))]
pub async fn plan(
    backend: &dyn StorageBackend,
    index: &FolderIndex,
    mapping: &Mapping,
    output: &Path,
    destination_index: usize,
) -> Result<Vec<CopyJob>> {
    if mapping.is_empty() {
        tracing::error!("No data to save");
        return Ok(vec![]);
    }
    backend.create_dir_all(output).await.or_raise(|| ErrorKind::Plan)?;

    let mut jobs = Vec::new();
    for (key, record) in mapping.iter() {
        let Some(entry) = index.get(key) else {
            tracing::debug!(key, "No input file for mapping key");
            continue;
        };
        match backend.is_file(&entry.path).await {
            Ok(true) => {},
            Ok(false) => {
                tracing::trace!(key, path = %entry.path.display(), "Not a regular file anymore");
                continue;
            },
            Err(e) => {
                tracing::error!(key, path = %entry.path.display(), error = %&*e, "Cannot inspect input file");
                continue;
            },
        }
        let stem = match record.field(destination_index) {
            Ok(field) => key_from_field(field),
            Err(e) => {
                tracing::error!(key, line = record.line(), error = %&*e, "No destination name");
                continue;
            },
        };
        let name = match with_stem(&entry.path, &stem) {
            Ok(name) => name,
            Err(e) => {
                tracing::error!(key, line = record.line(), error = %&*e, "Unusable destination name");
                continue;
            },
        };
        jobs.push(CopyJob {
            key: key.to_string(),
            source: entry.path.clone(),
            destination: output.join(name),
            stem,
        });
    }
    tracing::debug!(jobs = jobs.len(), "Planned copies");
    Ok(jobs)
}
