//! Routes table

use realtime::Result;
use serde::Serialize;

use crate::table::{Header, Row, RowError, TableKind, TableRow};

/// A route from `routes.txt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_type: Option<u16>,
    pub route_color: Option<String>,
}

pub struct RouteColumns {
    route_id: usize,
    agency_id: Option<usize>,
    short_name: Option<usize>,
    long_name: Option<usize>,
    route_type: Option<usize>,
    color: Option<usize>,
}

impl TableRow for RouteRecord {
    type Columns = RouteColumns;

    const KIND: TableKind = TableKind::Routes;

    fn columns(header: &Header) -> Result<RouteColumns> {
        Ok(RouteColumns {
            route_id: header.required("route_id")?,
            agency_id: header.optional("agency_id"),
            short_name: header.optional("route_short_name"),
            long_name: header.optional("route_long_name"),
            route_type: header.optional("route_type"),
            color: header.optional("route_color"),
        })
    }

    fn max_index(columns: &RouteColumns) -> usize {
        columns.route_id
    }

    fn from_row(columns: &RouteColumns, row: &Row<'_>) -> Result<Self, RowError> {
        let route_type = match columns.route_type {
            Some(idx) if !row.text(idx).is_empty() => Some(row.number(idx, "route_type")?),
            _ => None,
        };

        Ok(Self {
            route_id: row.identifier(columns.route_id, "route_id")?,
            agency_id: row.optional_text(columns.agency_id),
            route_short_name: row.optional_text(columns.short_name),
            route_long_name: row.optional_text(columns.long_name),
            route_type,
            route_color: row.optional_text(columns.color),
        })
    }
}
