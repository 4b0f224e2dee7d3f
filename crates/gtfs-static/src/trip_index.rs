//! # Trip Index
//!
//! Maps trip identifiers to their shapes and to their ordered stop visits.
//! Built once per static snapshot from `trips.txt` and `stop_times.txt`.

use std::collections::HashMap;

use serde::Serialize;

use crate::stop_times::StopTime;
use crate::trip_ids::variants_of;
use crate::trips::TripRecord;

/// A trip's visit to a stop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StopVisit {
    pub stop_id: String,
    pub sequence: u32,
}

/// Trip id to the shape ids it references, in discovery order.
#[derive(Debug, Default)]
pub struct TripShapeSet(HashMap<String, Vec<String>>);

impl TripShapeSet {
    /// Shape ids for a trip. A known trip without a shape yields an empty
    /// slice.
    #[must_use]
    pub fn get(&self, trip_id: &str) -> Option<&[String]> {
        self.0.get(trip_id).map(Vec::as_slice)
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

/// Trip id to its stop visits, ordered by stop sequence.
#[derive(Debug, Default)]
pub struct TripStopSequence(HashMap<String, Vec<StopVisit>>);

impl TripStopSequence {
    #[must_use]
    pub fn get(&self, trip_id: &str) -> Option<&[StopVisit]> {
        self.0.get(trip_id).map(Vec::as_slice)
    }

    /// Whether the trip ends where it starts.
    #[must_use]
    pub fn is_circular(&self, trip_id: &str) -> bool {
        match self.get(trip_id) {
            Some([first, .., last]) => first.stop_id == last.stop_id,
            _ => false,
        }
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

/// Shape and stop lookups for every trip in a snapshot.
#[derive(Debug, Default)]
pub struct TripIndex {
    pub shapes: TripShapeSet,
    pub stops: TripStopSequence,
    routes: HashMap<String, String>,
}

impl TripIndex {
    /// Build the index.
    ///
    /// Stop times for trips missing from `trips.txt` are still indexed.
    #[must_use]
    pub fn build(trips: &[TripRecord], stop_times: Vec<StopTime>) -> Self {
        let mut shapes: HashMap<String, Vec<String>> = HashMap::new();
        let mut routes = HashMap::new();

        for trip in trips {
            let shape_ids = shapes.entry(trip.trip_id.clone()).or_default();
            if let Some(shape_id) = &trip.shape_id
                && !shape_ids.contains(shape_id)
            {
                shape_ids.push(shape_id.clone());
            }
            if let Some(route_id) = &trip.route_id {
                routes.entry(trip.trip_id.clone()).or_insert_with(|| route_id.clone());
            }
        }

        let mut stops: HashMap<String, Vec<StopVisit>> = HashMap::new();
        for stop_time in stop_times {
            stops.entry(stop_time.trip_id).or_default().push(StopVisit {
                stop_id: stop_time.stop_id,
                sequence: stop_time.stop_sequence,
            });
        }
        // stable: equal sequences keep file order
        for visits in stops.values_mut() {
            visits.sort_by_key(|visit| visit.sequence);
        }

        Self { shapes: TripShapeSet(shapes), stops: TripStopSequence(stops), routes }
    }

    /// Route the trip belongs to, when `trips.txt` says so.
    #[must_use]
    pub fn route_of(&self, trip_id: &str) -> Option<&str> {
        self.routes.get(trip_id).map(String::as_str)
    }

    /// The first variant of `trip_id` with at least one shape, together with
    /// its shape ids.
    #[must_use]
    pub fn resolve_shapes(&self, trip_id: &str) -> Option<(String, &[String])> {
        resolve(&self.shapes.0, trip_id)
    }

    /// The first variant of `trip_id` with at least one stop visit, together
    /// with its visits.
    #[must_use]
    pub fn resolve_stops(&self, trip_id: &str) -> Option<(String, &[StopVisit])> {
        resolve(&self.stops.0, trip_id)
    }

    /// Up to `limit` known trip ids, sorted, for diagnostics.
    #[must_use]
    pub fn sample_trip_ids(&self, limit: usize) -> Vec<&str> {
        let mut ids = self.shapes.0.keys().map(String::as_str).collect::<Vec<_>>();
        ids.sort_unstable();
        ids.truncate(limit);
        ids
    }
}

fn resolve<'a, T>(map: &'a HashMap<String, Vec<T>>, trip_id: &str) -> Option<(String, &'a [T])> {
    variants_of(trip_id).into_iter().find_map(|variant| {
        let found = map.get(&variant).filter(|items| !items.is_empty())?;
        Some((variant, found.as_slice()))
    })
}
