//! Stops table

use std::collections::HashMap;

use realtime::Result;
use serde::Serialize;
use tracing::debug;

use crate::table::{Header, Row, RowError, TableKind, TableRow};
use crate::trip_index::StopVisit;

/// A stop from `stops.txt`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_code: Option<String>,
    pub stop_name: Option<String>,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

pub struct StopColumns {
    stop_id: usize,
    stop_code: Option<usize>,
    stop_name: Option<usize>,
    stop_lat: usize,
    stop_lon: usize,
}

impl TableRow for StopRecord {
    type Columns = StopColumns;

    const KIND: TableKind = TableKind::Stops;

    fn columns(header: &Header) -> Result<StopColumns> {
        Ok(StopColumns {
            stop_id: header.required("stop_id")?,
            stop_code: header.optional("stop_code"),
            stop_name: header.optional("stop_name"),
            stop_lat: header.required("stop_lat")?,
            stop_lon: header.required("stop_lon")?,
        })
    }

    fn max_index(columns: &StopColumns) -> usize {
        [columns.stop_id, columns.stop_lat, columns.stop_lon]
            .into_iter()
            .chain(columns.stop_code)
            .chain(columns.stop_name)
            .max()
            .unwrap_or_default()
    }

    fn from_row(columns: &StopColumns, row: &Row<'_>) -> Result<Self, RowError> {
        Ok(Self {
            stop_id: row.identifier(columns.stop_id, "stop_id")?,
            stop_code: row.optional_text(columns.stop_code),
            stop_name: row.optional_text(columns.stop_name),
            stop_lat: row.number(columns.stop_lat, "stop_lat")?,
            stop_lon: row.number(columns.stop_lon, "stop_lon")?,
        })
    }
}

/// Stops keyed by stop id.
#[derive(Debug, Default)]
pub struct StopIndex(HashMap<String, StopRecord>);

impl StopIndex {
    /// Index stops by id. A repeated id replaces the earlier row.
    #[must_use]
    pub fn new(stops: Vec<StopRecord>) -> Self {
        Self(stops.into_iter().map(|stop| (stop.stop_id.clone(), stop)).collect())
    }

    #[must_use]
    pub fn get(&self, stop_id: &str) -> Option<&StopRecord> {
        self.0.get(stop_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stops in visit order. Repeated visits are kept; visits to unknown stops
    /// are left out.
    #[must_use]
    pub fn in_sequence(&self, visits: &[StopVisit]) -> Vec<StopRecord> {
        visits
            .iter()
            .filter_map(|visit| {
                let stop = self.get(&visit.stop_id);
                if stop.is_none() {
                    debug!(stop_id = %visit.stop_id, "stop not in stops.txt");
                }
                stop.cloned()
            })
            .collect()
    }
}
