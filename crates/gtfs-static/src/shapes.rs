//! Shapes table

use realtime::Result;

use crate::table::{Header, Row, RowError, TableKind, TableRow};

/// A point of a shape polyline from `shapes.txt`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapePoint {
    pub shape_id: String,
    pub lat: f64,
    pub lon: f64,
    pub sequence: u32,
}

pub struct ShapeColumns {
    shape_id: usize,
    lat: usize,
    lon: usize,
    sequence: usize,
}

impl TableRow for ShapePoint {
    type Columns = ShapeColumns;

    const KIND: TableKind = TableKind::Shapes;

    fn columns(header: &Header) -> Result<ShapeColumns> {
        Ok(ShapeColumns {
            shape_id: header.required("shape_id")?,
            lat: header.required("shape_pt_lat")?,
            lon: header.required("shape_pt_lon")?,
            sequence: header.required("shape_pt_sequence")?,
        })
    }

    fn max_index(columns: &ShapeColumns) -> usize {
        columns.shape_id.max(columns.lat).max(columns.lon).max(columns.sequence)
    }

    fn from_row(columns: &ShapeColumns, row: &Row<'_>) -> Result<Self, RowError> {
        Ok(Self {
            shape_id: row.identifier(columns.shape_id, "shape_id")?,
            lat: row.number(columns.lat, "shape_pt_lat")?,
            lon: row.number(columns.lon, "shape_pt_lon")?,
            sequence: row.number(columns.sequence, "shape_pt_sequence")?,
        })
    }
}
