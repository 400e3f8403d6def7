pub mod backend;
pub mod error;
pub mod file;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::file::FileEntry;
pub use crate::path::{key_from_field, stem_of, validate_stem, with_stem};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
