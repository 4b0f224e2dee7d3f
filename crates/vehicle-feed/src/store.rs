//! # Vehicle Store
//!
//! The persistence port for durable vehicle records, plus an in-memory
//! implementation.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use realtime::Category;

use crate::observation::VehicleRecord;

/// Durable storage for vehicle records, unique per category and vehicle id.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Insert or replace whole records.
    async fn upsert_vehicles(&self, records: &[VehicleRecord]) -> Result<()>;

    /// Mark active records of `category` inactive unless their id is in
    /// `excluded`. `last_seen` is left untouched. Returns the number of
    /// records changed.
    async fn mark_inactive(&self, category: &Category, excluded: &[String]) -> Result<usize>;

    /// All records of `category`, or of every category when `None`.
    async fn get_all_vehicles(&self, category: Option<&Category>) -> Result<Vec<VehicleRecord>>;
}

/// Vehicle records held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<(Category, String), VehicleRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn upsert_vehicles(&self, records: &[VehicleRecord]) -> Result<()> {
        for record in records {
            let key = (record.category.clone(), record.vehicle_id().to_string());
            self.records.insert(key, record.clone());
        }
        Ok(())
    }

    async fn mark_inactive(&self, category: &Category, excluded: &[String]) -> Result<usize> {
        let mut changed = 0;
        for mut entry in self.records.iter_mut() {
            let record = entry.value_mut();
            if record.category == *category
                && record.is_active
                && !excluded.iter().any(|id| id == record.vehicle_id())
            {
                record.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn get_all_vehicles(&self, category: Option<&Category>) -> Result<Vec<VehicleRecord>> {
        let mut records = self
            .records
            .iter()
            .filter(|entry| category.is_none_or(|category| entry.key().0 == *category))
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        records.sort_by(|a, b| {
            (&a.category, a.vehicle_id()).cmp(&(&b.category, b.vehicle_id()))
        });
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::observation::VehicleObservation;

    fn record(category: Category, vehicle_id: &str) -> VehicleRecord {
        let timestamp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        VehicleRecord {
            category,
            observation: VehicleObservation {
                vehicle_id: vehicle_id.to_string(),
                trip_id: None,
                route_id: None,
                latitude: None,
                longitude: None,
                congestion_level: None,
                stop_id: None,
                current_status: None,
                timestamp,
            },
            is_active: true,
            last_seen: timestamp,
        }
    }

    #[tokio::test]
    async fn partitioned_by_category() {
        let store = MemoryStore::new();
        store
            .upsert_vehicles(&[
                record(Category::mrt_feeder(), "V1"),
                record(Category::mrt_feeder(), "V2"),
                record(Category::kl(), "V1"),
            ])
            .await
            .expect("should upsert");

        let changed = store
            .mark_inactive(&Category::mrt_feeder(), &["V1".to_string()])
            .await
            .expect("should mark");
        assert_eq!(changed, 1);

        let all = store.get_all_vehicles(None).await.expect("should list");
        assert_eq!(all.len(), 3);

        let feeder = store.get_all_vehicles(Some(&Category::mrt_feeder())).await.expect("should list");
        let active = feeder.iter().map(|r| (r.vehicle_id(), r.is_active)).collect::<Vec<_>>();
        assert_eq!(active, vec![("V1", true), ("V2", false)]);

        let kl = store.get_all_vehicles(Some(&Category::kl())).await.expect("should list");
        assert!(kl[0].is_active);
    }
}
