#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gtfs_static::{StaticSource, TableKind};
use realtime::Category;

/// In-memory static tables, editable between loads.
#[derive(Clone, Default)]
pub struct MockSource {
    tables: Arc<Mutex<HashMap<(Category, TableKind), Vec<u8>>>>,
    failing: Arc<Mutex<bool>>,
}

impl MockSource {
    #[allow(unused)]
    #[must_use]
    pub fn new() -> Self {
        let source = Self::default();
        let category = Category::mrt_feeder();
        source.set(&category, TableKind::Stops, "stop_id,stop_name,stop_lat,stop_lon\nS1,One,3.1,101.6\nS2,Two,3.2,101.7\n");
        source.set(&category, TableKind::Trips, "trip_id,route_id,shape_id\nT1,R1,shp_1\n");
        source.set(&category, TableKind::StopTimes, "trip_id,stop_id,stop_sequence\nT1,S1,2\nT1,S2,1\n");
        source
    }

    #[allow(unused)]
    pub fn set(&self, category: &Category, table: TableKind, raw: impl AsRef<[u8]>) {
        let raw = raw.as_ref().to_vec();
        self.tables.lock().expect("should lock").insert((category.clone(), table), raw);
    }

    #[allow(unused)]
    pub fn remove(&self, category: &Category, table: TableKind) {
        self.tables.lock().expect("should lock").remove(&(category.clone(), table));
    }

    #[allow(unused)]
    pub fn fail(&self, failing: bool) {
        *self.failing.lock().expect("should lock") = failing;
    }
}

#[async_trait]
impl StaticSource for MockSource {
    async fn read_table(&self, category: &Category, table: TableKind) -> Result<Option<Vec<u8>>> {
        if *self.failing.lock().expect("should lock") {
            return Err(anyhow!("storage unavailable"));
        }
        Ok(self.tables.lock().expect("should lock").get(&(category.clone(), table)).cloned())
    }
}
