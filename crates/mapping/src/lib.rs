//! Mapping file reader.
//!
//! A mapping file is a delimited text file (CSV by default) whose first
//! non-empty row is a header and whose remaining rows each name a source file
//! and the new name it should be copied under. This crate turns such a file
//! into a [`Mapping`]: the header plus an insertion-ordered table of
//! [`MappingRecord`]s keyed by the stem of each row's source field.
//!
//! # Example
//!
//! ```
//! use restem_mapping::{Options, from_reader};
//! use std::path::Path;
//!
//! let data = "src,dst\nIMG_001.jpg,beach\nIMG_002.jpg,sunset\n";
//! let mapping = from_reader(data.as_bytes(), Path::new("inline.csv"), &Options::default()).unwrap();
//! assert_eq!(mapping.header, ["src", "dst"]);
//! assert_eq!(mapping.get("IMG_002").unwrap().field(1).unwrap(), "sunset");
//! ```

pub mod error;
mod reader;
mod record;

pub use crate::reader::{Options, from_reader, read};
pub use crate::record::{Halt, Mapping, MappingRecord};
