//! # Static Snapshot
//!
//! A category's parsed static dataset: stops, routes, shapes and the trip
//! index. Snapshots are immutable once built. [`StaticCatalog`] holds the
//! current snapshot per category and swaps in a replacement only after it
//! has been completely built, so readers see either the old or the new
//! snapshot, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use realtime::{Category, Error, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::route_shape::{RouteShape, ShapeIndex, build_shape};
use crate::routes::RouteRecord;
use crate::shapes::ShapePoint;
use crate::source::StaticSource;
use crate::stop_times::StopTime;
use crate::stops::{StopIndex, StopRecord};
use crate::table::{Table, TableReport, TableRow, parse_table};
use crate::trip_index::TripIndex;
use crate::trips::TripRecord;

/// Outcome of loading a snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct LoadReport {
    pub category: Category,
    pub loaded_at: DateTime<Utc>,
    pub tables: Vec<TableReport>,
    /// Category the routes table was borrowed from, if any.
    pub routes_from: Option<Category>,
}

impl LoadReport {
    /// Rows dropped across all tables.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.tables.iter().map(|t| t.skipped).sum()
    }
}

/// Parsed static dataset for one category.
#[derive(Debug)]
pub struct GtfsSnapshot {
    pub category: Category,
    pub stops: StopIndex,
    pub routes: Vec<RouteRecord>,
    pub shapes: ShapeIndex,
    pub trips: TripIndex,
    pub report: LoadReport,
}

impl GtfsSnapshot {
    /// Load and index a category's tables.
    ///
    /// `stops.txt`, `trips.txt` and `stop_times.txt` are required; a missing
    /// `shapes.txt` or `routes.txt` leaves the snapshot without shapes or
    /// routes. A category without routes borrows them from its fallback
    /// category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when a required table is missing and
    /// [`Error::MissingColumn`] when a table header lacks a required column.
    pub async fn load(source: &impl StaticSource, category: &Category) -> Result<Self> {
        let stops = read::<StopRecord>(source, category, true).await?;
        let trips = read::<TripRecord>(source, category, true).await?;
        let stop_times = read::<StopTime>(source, category, true).await?;
        let shapes = read::<ShapePoint>(source, category, false).await?;

        let mut routes_from = None;
        let mut routes = read::<RouteRecord>(source, category, false).await?;
        if routes.rows.is_empty()
            && let Some(fallback) = category.fallback()
        {
            routes = read::<RouteRecord>(source, &fallback, false).await?;
            routes_from = Some(fallback);
        }

        let report = LoadReport {
            category: category.clone(),
            loaded_at: Utc::now(),
            tables: vec![
                stops.report(),
                trips.report(),
                stop_times.report(),
                shapes.report(),
                routes.report(),
            ],
            routes_from,
        };

        Ok(Self {
            category: category.clone(),
            stops: StopIndex::new(stops.rows),
            routes: routes.rows,
            shapes: ShapeIndex::new(shapes.rows),
            trips: TripIndex::build(&trips.rows, stop_times.rows),
            report,
        })
    }

    /// Polylines for a trip; empty when the trip cannot be resolved.
    #[must_use]
    pub fn route_shapes(&self, trip_id: &str) -> Vec<RouteShape> {
        build_shape(trip_id, &self.shapes, &self.trips, &self.stops)
    }

    /// Stops of a trip in visit order; empty when the trip cannot be
    /// resolved.
    #[must_use]
    pub fn stops_for_trip(&self, trip_id: &str) -> Vec<StopRecord> {
        self.trips
            .resolve_stops(trip_id)
            .map(|(_, visits)| self.stops.in_sequence(visits))
            .unwrap_or_default()
    }

    /// Distinct stops visited by any of `trip_ids`, ordered by the first
    /// resolvable trip's sequence. Stops that trip does not visit come last.
    #[must_use]
    pub fn stops_for_trips<'a>(
        &self, trip_ids: impl IntoIterator<Item = &'a str>,
    ) -> Vec<StopRecord> {
        let mut order: Option<HashMap<&str, usize>> = None;
        let mut stop_ids: Vec<&str> = Vec::new();

        for trip_id in trip_ids {
            let Some((_, visits)) = self.trips.resolve_stops(trip_id) else {
                continue;
            };
            if order.is_none() {
                let mut positions = HashMap::new();
                for (idx, visit) in visits.iter().enumerate() {
                    positions.entry(visit.stop_id.as_str()).or_insert(idx);
                }
                order = Some(positions);
            }
            for visit in visits {
                if !stop_ids.contains(&visit.stop_id.as_str()) {
                    stop_ids.push(&visit.stop_id);
                }
            }
        }

        let order = order.unwrap_or_default();
        stop_ids.sort_by_key(|stop_id| order.get(stop_id).copied().unwrap_or(usize::MAX));
        stop_ids.into_iter().filter_map(|stop_id| self.stops.get(stop_id).cloned()).collect()
    }
}

async fn read<T: TableRow>(
    source: &impl StaticSource, category: &Category, required: bool,
) -> Result<Table<T>> {
    let raw = source
        .read_table(category, T::KIND)
        .await
        .with_context(|| format!("reading {category} {}", T::KIND))?;

    match raw {
        Some(raw) => parse_table(&raw),
        None if required => Err(Error::NotFound(format!("{category} has no {}", T::KIND))),
        None => Ok(Table::default()),
    }
}

/// Current static snapshot per category.
pub struct StaticCatalog<S> {
    source: S,
    snapshots: DashMap<Category, Arc<GtfsSnapshot>>,
}

impl<S: StaticSource> StaticCatalog<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source, snapshots: DashMap::new() }
    }

    /// The category's current snapshot, if one has been loaded.
    #[must_use]
    pub fn snapshot(&self, category: &Category) -> Option<Arc<GtfsSnapshot>> {
        self.snapshots.get(category).map(|entry| Arc::clone(entry.value()))
    }

    /// Rebuild a category's snapshot and swap it in.
    ///
    /// On failure the previous snapshot, if any, stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be loaded.
    pub async fn refresh(&self, category: &Category) -> Result<LoadReport> {
        let snapshot = GtfsSnapshot::load(&self.source, category).await?;
        let report = snapshot.report.clone();

        info!(
            monotonic_counter.static_refreshes = 1,
            category = %category,
            stops = snapshot.stops.len(),
            trips = snapshot.trips.shapes.len(),
            shapes = snapshot.shapes.len(),
            routes = snapshot.routes.len(),
            skipped = report.skipped(),
            "static snapshot loaded"
        );

        self.snapshots.insert(category.clone(), Arc::new(snapshot));
        Ok(report)
    }

    /// Refresh each category in turn, returning the reports of those that
    /// loaded. Failures are logged and leave the category's previous
    /// snapshot in place.
    pub async fn refresh_all(&self, categories: &[Category]) -> Vec<LoadReport> {
        let mut reports = Vec::with_capacity(categories.len());
        for category in categories {
            match self.refresh(category).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(monotonic_counter.static_refresh_errors = 1, category = %category, "{e}");
                }
            }
        }
        reports
    }
}
