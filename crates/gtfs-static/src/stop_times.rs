//! Stop times table

use realtime::Result;
use tracing::trace;

use crate::table::{Header, Row, RowError, TableKind, TableRow};

/// A trip's visit to a stop from `stop_times.txt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

pub struct StopTimeColumns {
    trip_id: usize,
    stop_id: usize,
    stop_sequence: Option<usize>,
}

impl TableRow for StopTime {
    type Columns = StopTimeColumns;

    const KIND: TableKind = TableKind::StopTimes;

    fn columns(header: &Header) -> Result<StopTimeColumns> {
        Ok(StopTimeColumns {
            trip_id: header.required("trip_id")?,
            stop_id: header.required("stop_id")?,
            stop_sequence: header.optional("stop_sequence"),
        })
    }

    fn max_index(columns: &StopTimeColumns) -> usize {
        columns.trip_id.max(columns.stop_id)
    }

    // A missing or unreadable sequence falls back to the row's position in
    // the file.
    fn from_row(columns: &StopTimeColumns, row: &Row<'_>) -> Result<Self, RowError> {
        let ordinal = u32::try_from(row.ordinal()).unwrap_or(u32::MAX);
        let stop_sequence = match columns.stop_sequence {
            Some(idx) => row.number(idx, "stop_sequence").unwrap_or_else(|e| {
                trace!("{e}, using row ordinal {ordinal}");
                ordinal
            }),
            None => ordinal,
        };

        Ok(Self {
            trip_id: row.identifier(columns.trip_id, "trip_id")?,
            stop_id: row.identifier(columns.stop_id, "stop_id")?,
            stop_sequence,
        })
    }
}
