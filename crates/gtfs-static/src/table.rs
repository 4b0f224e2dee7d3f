//! # Static Table Parser
//!
//! Parses headerful, comma-delimited GTFS tables into typed rows. Columns are
//! resolved by header name so that column order can vary between datasets.
//! Unreadable rows are dropped and reported; a header missing a required
//! column makes the whole table unusable. Bytes that are not valid UTF-8 are
//! replaced per field, so a badly encoded name never costs the row.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use realtime::{Error, Result};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::warn;

const BOM: char = '\u{feff}';
const BOM_BYTES: &[u8] = b"\xef\xbb\xbf";

/// Static GTFS tables understood by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Stops,
    StopTimes,
    Trips,
    Shapes,
    Routes,
}

impl TableKind {
    /// File name of the table within a category directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Stops => "stops.txt",
            Self::StopTimes => "stop_times.txt",
            Self::Trips => "trips.txt",
            Self::Shapes => "shapes.txt",
            Self::Routes => "routes.txt",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A problem with a single data row. The row is dropped, the table stays
/// usable.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    ShortRow { line: u64, expected: usize, found: usize },

    #[error("line {line}: invalid {column} value {value:?}")]
    InvalidNumber { line: u64, column: &'static str, value: String },

    #[error("line {line}: {column} is empty")]
    EmptyField { line: u64, column: &'static str },

    #[error("line {line}: {message}")]
    Malformed { line: u64, message: String },
}

/// Column positions resolved from a table's header line.
#[derive(Debug)]
pub struct Header {
    kind: TableKind,
    positions: HashMap<String, usize>,
}

impl Header {
    fn new(kind: TableKind, record: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (idx, name) in record.iter().enumerate() {
            let name = name.trim_start_matches(BOM).trim().to_ascii_lowercase();
            // first occurrence wins for duplicated headers
            positions.entry(name).or_insert(idx);
        }
        Self { kind, positions }
    }

    /// Position of a column the table cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] when the header does not name the
    /// column.
    pub fn required(&self, column: &str) -> Result<usize> {
        self.optional(column)
            .ok_or_else(|| Error::MissingColumn(format!("{} has no {column} column", self.kind)))
    }

    /// Position of a column that may be absent.
    #[must_use]
    pub fn optional(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

/// A single data row with its position in the file.
pub struct Row<'a> {
    record: &'a StringRecord,
    line: u64,
    ordinal: usize,
}

impl Row<'_> {
    /// Trimmed text of the column, empty when the row is short.
    #[must_use]
    pub fn text(&self, idx: usize) -> &str {
        self.record.get(idx).unwrap_or_default().trim()
    }

    /// Text of an optional column, `None` when absent or empty.
    #[must_use]
    pub fn optional_text(&self, idx: Option<usize>) -> Option<String> {
        let value = self.text(idx?);
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Text of an identifier column. Identifiers are never empty.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::EmptyField`] when the column is blank.
    pub fn identifier(&self, idx: usize, column: &'static str) -> Result<String, RowError> {
        let value = self.text(idx);
        if value.is_empty() {
            return Err(RowError::EmptyField { line: self.line, column });
        }
        Ok(value.to_string())
    }

    /// Parse a numeric column.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::InvalidNumber`] when the value does not parse.
    pub fn number<T: FromStr>(&self, idx: usize, column: &'static str) -> Result<T, RowError> {
        let value = self.text(idx);
        value.parse().map_err(|_| RowError::InvalidNumber {
            line: self.line,
            column,
            value: value.to_string(),
        })
    }

    /// 1-based line number of the row in the file.
    #[must_use]
    pub const fn line(&self) -> u64 {
        self.line
    }

    /// 0-based index of the row among the table's data rows.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// A typed row of a static table.
pub trait TableRow: Sized {
    /// The table the row belongs to.
    const KIND: TableKind;

    /// Column positions the row reads from.
    type Columns;

    /// Resolve column positions from the header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] when a required column is absent.
    fn columns(header: &Header) -> Result<Self::Columns>;

    /// Highest column position the row reads.
    fn max_index(columns: &Self::Columns) -> usize;

    /// Build a typed row.
    ///
    /// # Errors
    ///
    /// Returns a [`RowError`] when the row cannot be read.
    fn from_row(columns: &Self::Columns, row: &Row<'_>) -> Result<Self, RowError>;
}

/// Parsed rows of one table together with the rows that were dropped.
#[derive(Debug)]
pub struct Table<T> {
    pub rows: Vec<T>,
    pub issues: Vec<RowError>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new(), issues: Vec::new() }
    }
}

impl<T: TableRow> Table<T> {
    /// Summary of the table for the snapshot load report.
    #[must_use]
    pub fn report(&self) -> TableReport {
        TableReport { table: T::KIND, rows: self.rows.len(), skipped: self.issues.len() }
    }
}

/// Row counts for one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: TableKind,
    pub rows: usize,
    pub skipped: usize,
}

/// Parse a raw table into typed rows.
///
/// An empty input yields an empty table.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] when the header lacks a required column.
pub fn parse_table<T: TableRow>(raw: impl AsRef<[u8]>) -> Result<Table<T>> {
    let raw = raw.as_ref();
    let raw = raw.strip_prefix(BOM_BYTES).unwrap_or(raw);
    let mut reader =
        ReaderBuilder::new().has_headers(false).flexible(true).trim(Trim::All).from_reader(raw);
    let mut records = reader.byte_records().map(|result| {
        result.map(|record| {
            let line = record.position().map_or(0, csv::Position::line);
            (StringRecord::from_byte_record_lossy(record), line)
        })
    });

    let Some(first) = records.next() else {
        return Ok(Table::default());
    };
    let (first, _) = first.map_err(|e| Error::MissingColumn(format!("{}: {e}", T::KIND)))?;
    let header = Header::new(T::KIND, &first);
    let columns = T::columns(&header)?;
    let expected = T::max_index(&columns) + 1;

    let mut table = Table::default();
    for (ordinal, result) in records.enumerate() {
        let outcome = result
            .map_err(|e| RowError::Malformed {
                line: e.position().map_or(0, csv::Position::line),
                message: e.to_string(),
            })
            .and_then(|(record, line)| {
                if record.len() < expected {
                    return Err(RowError::ShortRow { line, expected, found: record.len() });
                }
                T::from_row(&columns, &Row { record: &record, line, ordinal })
            });

        match outcome {
            Ok(row) => table.rows.push(row),
            Err(e) => table.issues.push(e),
        }
    }

    if !table.issues.is_empty() {
        warn!(
            monotonic_counter.static_rows_skipped = table.issues.len(),
            table = %T::KIND,
            first = %table.issues[0],
            "dropped unreadable rows"
        );
    }

    Ok(table)
}
