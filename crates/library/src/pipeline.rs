use crate::copy::{CopyEvent, Summary, default_concurrency, execute};
use crate::error::{ErrorKind, Result};
use crate::index::{FolderIndex, index_folder};
use crate::plan::plan;
use exn::ResultExt;
use restem_mapping::error::ErrorKind as MappingErrorKind;
use restem_mapping::{Halt, Mapping};
use restem_storage::BackendHandle;
use std::path::PathBuf;
use tracing::{Dispatch, Span, instrument};

/// Everything a single run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Folder holding the files to rename.
    pub input: PathBuf,
    /// Mapping file.
    pub mapping: PathBuf,
    /// Folder the renamed copies are written to.
    pub output: PathBuf,
    /// Source key index and delimiter of the mapping file.
    pub csv: restem_mapping::Options,
    /// Zero-based field holding the destination stem.
    pub destination_index: usize,
    /// Maximum number of copies in flight.
    pub concurrency: usize,
}
impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            mapping: PathBuf::new(),
            output: PathBuf::from("output"),
            csv: restem_mapping::Options::default(),
            destination_index: 1,
            concurrency: default_concurrency(),
        }
    }
}

/// Outcome of a run.
#[derive(Debug)]
pub struct Report {
    /// Files indexed in the input folder.
    pub files: usize,
    /// Records read from the mapping file.
    pub records: usize,
    /// Set when reading the mapping stopped early.
    pub halted: Option<Halt>,
    pub summary: Summary,
}

/// Index the input folder, read the mapping, plan and copy.
///
/// The index and the mapping are loaded concurrently. A missing input folder,
/// or a missing or empty mapping file, is logged and treated as having
/// nothing to do. Per-file copy failures are counted in the report.
///
/// # Errors
/// Anything else that stops the run: the input folder or mapping file cannot
/// be read, or the output folder cannot be created.
#[instrument(skip_all, fields(backend = backend.name()))]
pub async fn run(backend: BackendHandle, options: &RunOptions, on_event: impl FnMut(&CopyEvent)) -> Result<Report> {
    let (index, mapping) = tokio::join!(index_folder(backend.as_ref(), &options.input), read_mapping(options));
    let index = match index {
        Ok(index) => index,
        Err(e) if matches!(&*e, ErrorKind::NotADirectory(_)) => {
            tracing::error!("Input folder {} is not found", options.input.display());
            FolderIndex::default()
        },
        Err(e) => return Err(e),
    };
    let mapping = mapping?;
    tracing::info!("Files on input folder: {}. Records on mapping file: {}", index.len(), mapping.len());

    let jobs = plan(backend.as_ref(), &index, &mapping, &options.output, options.destination_index).await?;
    let summary = execute(backend, jobs, options.concurrency, on_event).await;
    Ok(Report {
        files: index.len(),
        records: mapping.len(),
        halted: mapping.halted,
        summary,
    })
}

/// Reads the mapping on the blocking pool, keeping the caller's subscriber
/// and span.
async fn read_mapping(options: &RunOptions) -> Result<Mapping> {
    let path = options.mapping.clone();
    let csv = options.csv;
    let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
    let span = Span::current();
    let result = tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&dispatch, || span.in_scope(|| restem_mapping::read(&path, &csv)))
    })
    .await
    .or_raise(|| ErrorKind::Mapping)?;

    match result {
        Ok(mapping) => Ok(mapping),
        Err(e) => match &*e {
            MappingErrorKind::NotFound(path) => {
                tracing::error!("File {} is not found", path.display());
                Ok(Mapping::default())
            },
            MappingErrorKind::Empty(path) => {
                tracing::error!("Is {} empty?", path.display());
                Ok(Mapping::default())
            },
            _ => Err(e).or_raise(|| ErrorKind::Mapping),
        },
    }
}
