//! Layered configuration for restem.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults,
//! 2. a config file (`restem.toml`, `restem.yaml`, `restem.yml` or
//!    `restem.json`),
//! 3. `RESTEM_*` environment variables,
//! 4. command line [`Overrides`].

pub mod error;
mod loader;
mod settings;

pub use crate::loader::{ENV_PREFIX, FILE_STEM, Loader};
pub use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Merged, not yet validated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base for relative paths; the current directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<PathBuf>,
    /// Folder holding the files to rename (required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// Mapping file (required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_csv: Option<PathBuf>,
    pub output: PathBuf,
    pub csv_key_idx_src: usize,
    pub csv_key_idx_dst: usize,
    pub delimiter: char,
    /// Copies in flight; derived from the available parallelism when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    pub dry_run: bool,
    pub verbose: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            work: None,
            input: None,
            input_csv: None,
            output: PathBuf::from("output"),
            csv_key_idx_src: 0,
            csv_key_idx_dst: 1,
            delimiter: ',',
            concurrency: None,
            dry_run: false,
            verbose: false,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_csv: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_key_idx_src: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_key_idx_dst: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}
