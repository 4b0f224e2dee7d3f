//! # Query Surface
//!
//! Read access to the durable vehicle set, the static snapshots and the
//! latest feed cycles, plus explicit static refresh.

use std::collections::HashMap;
use std::sync::Arc;

use gtfs_static::{
    GtfsSnapshot, LoadReport, RouteRecord, RouteShape, StaticCatalog, StaticSource, StopRecord,
};
use realtime::{Category, Error, Result, not_found};
use vehicle_feed::{CycleReceiver, CycleSummary, VehicleRecord, VehicleStore};

pub struct Tracker {
    catalog: StaticCatalog<Arc<dyn StaticSource>>,
    store: Arc<dyn VehicleStore>,
    cycles: HashMap<Category, CycleReceiver>,
}

impl Tracker {
    #[must_use]
    pub fn new(source: Arc<dyn StaticSource>, store: Arc<dyn VehicleStore>) -> Self {
        Self { catalog: StaticCatalog::new(source), store, cycles: HashMap::new() }
    }

    /// Follow the feed cycles published for each category.
    #[must_use]
    pub fn with_cycles(mut self, cycles: HashMap<Category, CycleReceiver>) -> Self {
        self.cycles = cycles;
        self
    }

    /// Summary of the category's latest completed feed cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the category is not polled or has not
    /// completed a cycle yet.
    pub fn get_last_cycle(&self, category: &Category) -> Result<CycleSummary> {
        let receiver =
            self.cycles.get(category).ok_or_else(|| not_found!("{} is not polled", category))?;
        receiver
            .borrow()
            .as_ref()
            .map(|outcome| outcome.summary())
            .ok_or_else(|| not_found!("no completed cycle for {}", category))
    }

    /// Every vehicle of a category, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] when the store cannot be read.
    pub async fn get_vehicles(&self, category: &Category) -> Result<Vec<VehicleRecord>> {
        self.store
            .get_all_vehicles(Some(category))
            .await
            .map_err(|e| Error::Persistence(format!("{e:#}")))
    }

    /// Vehicles of a category currently assigned to `route_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] when the store cannot be read.
    pub async fn get_vehicles_on_route(
        &self, category: &Category, route_id: &str,
    ) -> Result<Vec<VehicleRecord>> {
        let mut vehicles = self.get_vehicles(category).await?;
        vehicles.retain(|v| v.observation.route_id.as_deref() == Some(route_id));
        Ok(vehicles)
    }

    /// Routes of a category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the category has no static data.
    pub fn get_routes(&self, category: &Category) -> Result<Vec<RouteRecord>> {
        Ok(self.snapshot(category)?.routes.clone())
    }

    /// Polylines for a trip. An unknown trip yields no shapes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the category has no static data.
    pub fn get_route_shape(&self, category: &Category, trip_id: &str) -> Result<Vec<RouteShape>> {
        Ok(self.snapshot(category)?.route_shapes(trip_id))
    }

    /// Stops of a trip in visit order. An unknown trip yields no stops.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the category has no static data.
    pub fn get_stops_for_trip(
        &self, category: &Category, trip_id: &str,
    ) -> Result<Vec<StopRecord>> {
        Ok(self.snapshot(category)?.stops_for_trip(trip_id))
    }

    /// Stops served by the vehicles on a route, ordered along the first
    /// vehicle's trip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the category has no static data and
    /// [`Error::Persistence`] when the store cannot be read.
    pub async fn get_stops_for_route(
        &self, category: &Category, route_id: &str,
    ) -> Result<Vec<StopRecord>> {
        let snapshot = self.snapshot(category)?;
        let vehicles = self.get_vehicles_on_route(category, route_id).await?;
        let trip_ids = vehicles.iter().filter_map(|v| v.observation.trip_id.as_deref());
        Ok(snapshot.stops_for_trips(trip_ids))
    }

    /// Reload a category's static data.
    ///
    /// # Errors
    ///
    /// Returns an error when the static tables cannot be loaded; the previous
    /// snapshot stays in use.
    pub async fn refresh(&self, category: &Category) -> Result<LoadReport> {
        self.catalog.refresh(category).await
    }

    /// Reload several categories, skipping those that fail.
    pub async fn refresh_all(&self, categories: &[Category]) -> Vec<LoadReport> {
        self.catalog.refresh_all(categories).await
    }

    fn snapshot(&self, category: &Category) -> Result<Arc<GtfsSnapshot>> {
        self.catalog.snapshot(category).ok_or_else(|| not_found!("no static data for {}", category))
    }
}
