//! Rename files by copying them according to a mapping file.
//!
//! A run goes through four steps:
//! 1. [`index_folder`] lists the input folder and keys every file by stem.
//! 2. [`restem_mapping::read`] loads the mapping file.
//! 3. [`plan`] joins the two into [`CopyJob`]s.
//! 4. [`copy::execute`] copies the jobs concurrently and tallies the result.
//!
//! [`run`] wires them together.

pub mod copy;
pub mod error;
mod index;
mod pipeline;
mod plan;

pub use crate::index::{FolderIndex, index_folder};
pub use crate::pipeline::{Report, RunOptions, run};
pub use crate::plan::{CopyJob, plan};
