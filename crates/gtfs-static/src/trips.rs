//! Trips table

use realtime::Result;

use crate::table::{Header, Row, RowError, TableKind, TableRow};

/// A trip from `trips.txt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripRecord {
    pub trip_id: String,
    pub route_id: Option<String>,
    pub service_id: Option<String>,
    pub shape_id: Option<String>,
    pub trip_headsign: Option<String>,
}

pub struct TripColumns {
    trip_id: usize,
    route_id: Option<usize>,
    service_id: Option<usize>,
    shape_id: Option<usize>,
    trip_headsign: Option<usize>,
}

impl TableRow for TripRecord {
    type Columns = TripColumns;

    const KIND: TableKind = TableKind::Trips;

    fn columns(header: &Header) -> Result<TripColumns> {
        Ok(TripColumns {
            trip_id: header.required("trip_id")?,
            route_id: header.optional("route_id"),
            service_id: header.optional("service_id"),
            shape_id: header.optional("shape_id"),
            trip_headsign: header.optional("trip_headsign"),
        })
    }

    // Only the trip id is needed; trailing optional columns may be cut short.
    fn max_index(columns: &TripColumns) -> usize {
        columns.trip_id
    }

    fn from_row(columns: &TripColumns, row: &Row<'_>) -> Result<Self, RowError> {
        Ok(Self {
            trip_id: row.identifier(columns.trip_id, "trip_id")?,
            route_id: row.optional_text(columns.route_id),
            service_id: row.optional_text(columns.service_id),
            shape_id: row.optional_text(columns.shape_id),
            trip_headsign: row.optional_text(columns.trip_headsign),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    #[test]
    fn optional_shape() {
        let raw = "route_id,service_id,trip_id,shape_id
T7890,weekday,T7890_1,shp_1
T7890,weekday,T7890_2,
T7890,weekday,T7890_3
";
        let table = parse_table::<TripRecord>(raw).expect("should parse");
        let shapes = table.rows.iter().map(|t| t.shape_id.as_deref()).collect::<Vec<_>>();
        assert_eq!(shapes, vec![Some("shp_1"), None, None]);
        assert_eq!(table.rows[0].route_id.as_deref(), Some("T7890"));
    }
}
