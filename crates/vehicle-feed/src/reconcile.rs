//! # Vehicle Reconciler
//!
//! Merges a cycle's observations into the durable vehicle set. Observed
//! vehicles are upserted as active; previously active vehicles missing from
//! the batch are marked inactive. Nothing is ever removed.

use std::collections::{BTreeMap, BTreeSet};

use realtime::Category;
use serde::Serialize;

use crate::observation::{VehicleObservation, VehicleRecord};

/// Counts for a single reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Distinct vehicles in the batch.
    pub observed: usize,
    /// Vehicles seen for the first time.
    pub created: usize,
    /// Known vehicles updated by the batch, including reactivated ones.
    pub refreshed: usize,
    /// Active vehicles marked inactive.
    pub demoted: usize,
}

/// Result of merging a batch into the current state.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    /// The complete new state, ordered by vehicle id.
    pub state: Vec<VehicleRecord>,
    /// Records written for the vehicles in the batch.
    pub upserts: Vec<VehicleRecord>,
    /// Ids of the vehicles in the batch. Every other vehicle is inactive.
    pub seen: Vec<String>,
    pub report: CycleReport,
}

/// Merge `observations` into `current`.
///
/// The last observation of a vehicle in the batch wins. `last_seen` takes
/// the observation timestamp, but never moves backwards while a vehicle
/// stays active. Inactive vehicles keep their `last_seen`.
#[must_use]
pub fn reconcile(
    category: &Category, observations: Vec<VehicleObservation>, current: &[VehicleRecord],
) -> Reconciliation {
    let mut state = current
        .iter()
        .filter(|record| record.category == *category)
        .map(|record| (record.vehicle_id().to_string(), record.clone()))
        .collect::<BTreeMap<_, _>>();

    let mut batch = BTreeMap::new();
    for observation in observations {
        batch.insert(observation.vehicle_id.clone(), observation);
    }

    let mut report = CycleReport { observed: batch.len(), ..CycleReport::default() };
    let mut upserts = Vec::with_capacity(batch.len());

    for (vehicle_id, observation) in batch {
        let last_seen = match state.get(&vehicle_id) {
            Some(existing) => {
                report.refreshed += 1;
                if existing.is_active {
                    existing.last_seen.max(observation.timestamp)
                } else {
                    observation.timestamp
                }
            }
            None => {
                report.created += 1;
                observation.timestamp
            }
        };

        let record =
            VehicleRecord { category: category.clone(), observation, is_active: true, last_seen };
        upserts.push(record.clone());
        state.insert(vehicle_id, record);
    }

    let seen =
        upserts.iter().map(|record| record.vehicle_id().to_string()).collect::<BTreeSet<_>>();
    for record in state.values_mut() {
        if record.is_active && !seen.contains(record.vehicle_id()) {
            record.is_active = false;
            report.demoted += 1;
        }
    }

    Reconciliation {
        state: state.into_values().collect(),
        upserts,
        seen: seen.into_iter().collect(),
        report,
    }
}
