use crate::error::{ErrorKind, Result};
use std::collections::HashMap;
use std::fmt;

/// One data row of a mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    line: u64,
    fields: Vec<String>,
}
impl MappingRecord {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// 1-based line the row started on.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Field at a zero-based index.
    ///
    /// # Errors
    /// [`FieldOutOfRange`](ErrorKind::FieldOutOfRange) when the row is too short.
    pub fn field(&self, index: usize) -> Result<&str> {
        match self.fields.get(index) {
            Some(field) => Ok(field.as_str()),
            None => exn::bail!(ErrorKind::FieldOutOfRange { index, fields: self.fields.len() }),
        }
    }
}

/// Why reading stopped before the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halt {
    /// 1-based line of the offending row.
    pub line: u64,
    /// The source-key index that was out of range.
    pub key_index: usize,
    /// Number of fields the offending row had.
    pub fields: usize,
}
impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: key index {} out of range ({} fields)", self.line, self.key_index, self.fields)
    }
}

/// Parsed mapping file: header row plus records keyed by source stem.
///
/// Iteration follows the order keys were first seen. Inserting a record under
/// an existing key replaces the stored record (last write wins) without moving
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    pub header: Vec<String>,
    records: Vec<(String, MappingRecord)>,
    positions: HashMap<String, usize>,
    /// Set when a row's source key could not be read and the rest of the file
    /// was skipped.
    pub halted: Option<Halt>,
}
impl Mapping {
    pub fn new(header: Vec<String>) -> Self {
        Self { header, ..Self::default() }
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, record: MappingRecord) -> Option<MappingRecord> {
        let key = key.into();
        match self.positions.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position].1, record)),
            None => {
                self.positions.insert(key.clone(), self.records.len());
                self.records.push((key, record));
                None
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&MappingRecord> {
        self.positions.get(key).map(|&position| &self.records[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
