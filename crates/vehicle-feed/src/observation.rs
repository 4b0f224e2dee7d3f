//! # Vehicle Observations
//!
//! A [`VehicleObservation`] is one vehicle's report from a single feed cycle.
//! A [`VehicleRecord`] is the durable view of a vehicle: its latest
//! observation plus whether it is still reporting.

use chrono::{DateTime, Utc};
use gtfs_realtime::vehicle_position;
use realtime::Category;
use serde::{Serialize, Serializer};

/// Rendering of an absent field.
pub const NOT_AVAILABLE: &str = "N/A";

/// A vehicle's progress relative to its current stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    IncomingAt,
    StoppedAt,
    InTransitTo,
}

impl VehicleStatus {
    /// Map a feed status value. Unknown values yield `None`.
    #[must_use]
    pub fn from_feed(value: i32) -> Option<Self> {
        match vehicle_position::VehicleStopStatus::try_from(value).ok()? {
            vehicle_position::VehicleStopStatus::IncomingAt => Some(Self::IncomingAt),
            vehicle_position::VehicleStopStatus::StoppedAt => Some(Self::StoppedAt),
            vehicle_position::VehicleStopStatus::InTransitTo => Some(Self::InTransitTo),
        }
    }
}

/// Traffic conditions reported by a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CongestionLevel {
    UnknownCongestionLevel,
    RunningSmoothly,
    StopAndGo,
    Congestion,
    SevereCongestion,
}

impl CongestionLevel {
    /// Map a feed congestion value. Unknown values yield `None`.
    #[must_use]
    pub fn from_feed(value: i32) -> Option<Self> {
        use vehicle_position::CongestionLevel as Feed;

        match Feed::try_from(value).ok()? {
            Feed::UnknownCongestionLevel => Some(Self::UnknownCongestionLevel),
            Feed::RunningSmoothly => Some(Self::RunningSmoothly),
            Feed::StopAndGo => Some(Self::StopAndGo),
            Feed::Congestion => Some(Self::Congestion),
            Feed::SevereCongestion => Some(Self::SevereCongestion),
        }
    }
}

/// One vehicle's report from a single feed cycle. Absent fields are `None`
/// and render as `"N/A"`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleObservation {
    pub vehicle_id: String,
    #[serde(serialize_with = "or_not_available")]
    pub trip_id: Option<String>,
    #[serde(serialize_with = "or_not_available")]
    pub route_id: Option<String>,
    /// Decimal degrees rounded to 5 places.
    #[serde(serialize_with = "or_not_available")]
    pub latitude: Option<f64>,
    /// Decimal degrees rounded to 5 places.
    #[serde(serialize_with = "or_not_available")]
    pub longitude: Option<f64>,
    #[serde(serialize_with = "or_not_available")]
    pub congestion_level: Option<CongestionLevel>,
    #[serde(serialize_with = "or_not_available")]
    pub stop_id: Option<String>,
    #[serde(serialize_with = "or_not_available")]
    pub current_status: Option<VehicleStatus>,
    pub timestamp: DateTime<Utc>,
}

/// The durable view of a vehicle within a category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub category: Category,
    #[serde(flatten)]
    pub observation: VehicleObservation,
    pub is_active: bool,
    pub last_seen: DateTime<Utc>,
}

impl VehicleRecord {
    #[must_use]
    pub fn vehicle_id(&self) -> &str {
        &self.observation.vehicle_id
    }
}

#[allow(clippy::ref_option)]
fn or_not_available<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(value) => value.serialize(serializer),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}
