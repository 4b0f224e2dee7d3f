//! # Route Shape Builder
//!
//! Reconstructs the ordered polylines of a trip for display. The trip id is
//! resolved against the trip index using [`variants_of`](crate::variants_of);
//! an unresolved trip yields no shapes rather than an error.

use std::collections::HashMap;

use geo::{Distance, Haversine, Point};
use serde::Serialize;
use tracing::debug;

use crate::shapes::ShapePoint;
use crate::stops::{StopIndex, StopRecord};
use crate::trip_ids::variants_of;
use crate::trip_index::{StopVisit, TripIndex};

const SAMPLE_TRIP_IDS: usize = 10;

/// Direction of travel along a shape relative to the trip's stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

/// An ordered polyline for one of a trip's shapes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteShape {
    /// The trip id variant the shape was found under.
    pub trip_id: String,
    pub shape_id: String,
    /// `[latitude, longitude]` pairs in shape sequence order.
    pub points: Vec<[f64; 2]>,
    pub direction: Option<Direction>,
}

/// Shape points grouped by shape id, each group ordered by sequence.
#[derive(Debug, Default)]
pub struct ShapeIndex(HashMap<String, Vec<ShapePoint>>);

impl ShapeIndex {
    /// Group and order shape points. Points sharing a sequence keep their
    /// file order.
    #[must_use]
    pub fn new(points: Vec<ShapePoint>) -> Self {
        let mut shapes: HashMap<String, Vec<ShapePoint>> = HashMap::new();
        for point in points {
            shapes.entry(point.shape_id.clone()).or_default().push(point);
        }
        for points in shapes.values_mut() {
            points.sort_by_key(|point| point.sequence);
        }
        Self(shapes)
    }

    #[must_use]
    pub fn get(&self, shape_id: &str) -> Option<&[ShapePoint]> {
        self.0.get(shape_id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the polylines for `trip_id`, one per shape in discovery order.
///
/// Shapes with fewer than two points are still returned. Shape ids with no
/// points at all are left out.
#[must_use]
pub fn build_shape(
    trip_id: &str, shapes: &ShapeIndex, trips: &TripIndex, stops: &StopIndex,
) -> Vec<RouteShape> {
    let Some((resolved, shape_ids)) = trips.resolve_shapes(trip_id) else {
        debug!(
            trip_id,
            variants = ?variants_of(trip_id),
            available = ?trips.sample_trip_ids(SAMPLE_TRIP_IDS),
            "no shapes for trip"
        );
        return Vec::new();
    };

    // stop_times may carry a different spelling of the trip id than trips.txt
    let visits = trips.resolve_stops(trip_id).map(|(_, visits)| visits);

    shape_ids
        .iter()
        .filter_map(|shape_id| {
            let Some(points) = shapes.get(shape_id).filter(|points| !points.is_empty()) else {
                debug!(trip_id = %resolved, shape_id = %shape_id, "shape has no points");
                return None;
            };

            Some(RouteShape {
                trip_id: resolved.clone(),
                shape_id: shape_id.clone(),
                points: points.iter().map(|p| [p.lat, p.lon]).collect(),
                direction: visits.and_then(|visits| direction(points, visits, stops)),
            })
        })
        .collect()
}

// Compares how well the shape's ends line up with the trip's first and last
// stops. Ties, such as a loop starting and ending at the same stop, stay
// unknown.
fn direction(points: &[ShapePoint], visits: &[StopVisit], stops: &StopIndex) -> Option<Direction> {
    let [first_visit, .., last_visit] = visits else {
        return None;
    };
    let first_stop = stops.get(&first_visit.stop_id)?;
    let last_stop = stops.get(&last_visit.stop_id)?;
    let start = points.first()?;
    let end = points.last()?;

    let forward = distance(first_stop, start) + distance(last_stop, end);
    let backward = distance(first_stop, end) + distance(last_stop, start);

    if forward < backward {
        Some(Direction::Forward)
    } else if backward < forward {
        Some(Direction::Backward)
    } else {
        None
    }
}

fn distance(stop: &StopRecord, point: &ShapePoint) -> f64 {
    Haversine.distance(Point::new(stop.stop_lon, stop.stop_lat), Point::new(point.lon, point.lat))
}
