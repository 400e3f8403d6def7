use crate::error::{ErrorKind, Result};
use crate::record::{Halt, Mapping, MappingRecord};
use csv::{ReaderBuilder, StringRecord};
use exn::ResultExt;
use restem_storage::key_from_field;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::instrument;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// How a mapping file is split into fields and keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Zero-based field holding the source file name (or stem).
    pub key_index: usize,
    /// Field delimiter; must be a single byte.
    pub delimiter: u8,
}
impl Default for Options {
    fn default() -> Self {
        Self { key_index: 0, delimiter: b',' }
    }
}

/// Reads a mapping file from disk.
///
/// See [`from_reader`] for the parsing rules.
///
/// # Errors
/// - [`NotFound`](ErrorKind::NotFound) if `path` is not a regular file,
/// - [`Io`](ErrorKind::Io) if it cannot be opened,
/// - anything [`from_reader`] raises.
#[instrument(skip(options), fields(key_index = options.key_index))]
pub fn read(path: &Path, options: &Options) -> Result<Mapping> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    from_reader(file, path, options)
}

/// Parses delimited data into a [`Mapping`].
///
/// - The first non-empty row becomes the header; a leading byte-order mark
///   is dropped and every blank line before the header is logged.
/// - Every later non-empty row is stored under the stem of its key field
///   (directories and the final extension stripped). Duplicate keys keep the
///   last row.
/// - A row without a field at `key_index` stops reading. The records read
///   so far are returned with [`Mapping::halted`] describing the row.
///
/// `source` only labels log messages and errors.
///
/// # Errors
/// - [`Empty`](ErrorKind::Empty) if there is no non-empty row at all,
/// - [`Parse`](ErrorKind::Parse) on data the CSV parser rejects.
pub fn from_reader<R: Read>(reader: R, source: &Path, options: &Options) -> Result<Mapping> {
    let mut reader = BufReader::new(reader);
    if reader.fill_buf().or_raise(|| ErrorKind::Io(source.to_path_buf()))?.starts_with(BOM) {
        reader.consume(BOM.len());
    }
    // The CSV parser drops blank lines without reporting them, so the ones in
    // front of the header are consumed here. Line numbers it reports are
    // shifted by that many lines.
    let offset = skip_blank_lines(&mut reader, source)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);
    let mut rows = reader.records();

    let mut mapping = match rows.next() {
        Some(row) => Mapping::new(parsed(row, offset)?.iter().map(str::to_string).collect()),
        None => exn::bail!(ErrorKind::Empty(source.to_path_buf())),
    };

    for row in rows {
        let row = parsed(row, offset)?;
        let Some(key_field) = row.get(options.key_index) else {
            let halt = Halt {
                line: line(&row, offset),
                key_index: options.key_index,
                fields: row.len(),
            };
            tracing::error!(source = %source.display(), %halt, "Mapping key index error; remaining rows skipped");
            mapping.halted = Some(halt);
            break;
        };
        let key = key_from_field(key_field);
        let record = MappingRecord::new(line(&row, offset), row.iter().map(str::to_string).collect());
        if let Some(previous) = mapping.insert(key.as_str(), record) {
            tracing::debug!(key = %key, replaced = previous.line(), "Duplicate mapping key; keeping the later row");
        }
    }
    Ok(mapping)
}

/// Consumes empty lines (`\n` or `\r\n`) at the front of `reader`, logging
/// each one, and returns how many there were.
fn skip_blank_lines(reader: &mut impl BufRead, source: &Path) -> Result<u64> {
    let mut skipped = 0;
    loop {
        let buf = reader.fill_buf().or_raise(|| ErrorKind::Io(source.to_path_buf()))?;
        let len = if buf.starts_with(b"\r\n") {
            2
        } else if buf.starts_with(b"\n") {
            1
        } else {
            return Ok(skipped);
        };
        reader.consume(len);
        skipped += 1;
        tracing::info!(source = %source.display(), line = skipped, "Re-reading mapping header");
    }
}

fn parsed(row: std::result::Result<StringRecord, csv::Error>, offset: u64) -> Result<StringRecord> {
    let line = row.as_ref().err().and_then(|e| e.position()).map(|p| p.line() + offset).unwrap_or(0);
    row.or_raise(|| ErrorKind::Parse { line })
}

fn line(row: &StringRecord, offset: u64) -> u64 {
    row.position().map(|p| p.line() + offset).unwrap_or(0)
}
