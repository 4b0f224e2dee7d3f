//! # Feed Decoder
//!
//! Decodes a GTFS-Realtime `FeedMessage` into vehicle observations. Entities
//! without a vehicle payload are skipped; a buffer that does not decode fails
//! the whole cycle.

use chrono::{DateTime, Utc};
use gtfs_realtime::FeedMessage;
use prost::Message;
use realtime::{Error, Result};
use tracing::warn;

use crate::observation::{CongestionLevel, VehicleObservation, VehicleStatus};

/// Decode a feed buffer.
///
/// Observations without a feed timestamp are stamped with `received_at`.
///
/// # Errors
///
/// Returns [`Error::Decode`] when the buffer is not a valid `FeedMessage`.
pub fn decode(bytes: &[u8], received_at: DateTime<Utc>) -> Result<Vec<VehicleObservation>> {
    let feed = FeedMessage::decode(bytes).map_err(|e| Error::Decode(e.to_string()))?;

    let mut observations = Vec::with_capacity(feed.entity.len());
    for entity in feed.entity {
        let Some(position) = entity.vehicle else {
            continue;
        };

        // the descriptor id identifies the vehicle; the entity id stands in
        // when it is missing
        let vehicle_id = position
            .vehicle
            .as_ref()
            .and_then(|vehicle| present(vehicle.id.as_deref()))
            .or_else(|| present(Some(&entity.id)));
        let Some(vehicle_id) = vehicle_id else {
            warn!(monotonic_counter.feed_entities_skipped = 1, "vehicle entity has no id");
            continue;
        };

        let trip = position.trip.as_ref();
        let (latitude, longitude) = position
            .position
            .as_ref()
            .and_then(|p| Some((round5(p.latitude)?, round5(p.longitude)?)))
            .unzip();

        let timestamp = position
            .timestamp
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(received_at);

        observations.push(VehicleObservation {
            vehicle_id,
            trip_id: trip.and_then(|t| present(t.trip_id.as_deref())),
            route_id: trip.and_then(|t| present(t.route_id.as_deref())),
            latitude,
            longitude,
            congestion_level: position.congestion_level.and_then(CongestionLevel::from_feed),
            stop_id: present(position.stop_id.as_deref()),
            current_status: position.current_status.and_then(VehicleStatus::from_feed),
            timestamp,
        });
    }

    Ok(observations)
}

fn present(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(ToString::to_string)
}

// fixed 5-decimal precision
fn round5(degrees: f32) -> Option<f64> {
    let degrees = f64::from(degrees);
    degrees.is_finite().then(|| (degrees * 100_000.0).round() / 100_000.0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use gtfs_realtime::{
        FeedEntity, FeedHeader, Position, TripDescriptor, VehicleDescriptor, VehiclePosition,
    };

    use super::*;

    fn received_at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_100, 0).unwrap()
    }

    fn feed(entity: Vec<FeedEntity>) -> Vec<u8> {
        FeedMessage {
            header: FeedHeader { gtfs_realtime_version: "2.0".to_string(), ..Default::default() },
            entity,
            ..Default::default()
        }
        .encode_to_vec()
    }

    #[test]
    fn full_entity() {
        let bytes = feed(vec![FeedEntity {
            id: "e1".to_string(),
            vehicle: Some(VehiclePosition {
                trip: Some(TripDescriptor {
                    trip_id: Some("T789_1".to_string()),
                    route_id: Some("T789".to_string()),
                    ..Default::default()
                }),
                vehicle: Some(VehicleDescriptor {
                    id: Some("VEH1".to_string()),
                    ..Default::default()
                }),
                position: Some(Position {
                    latitude: 3.142_384_5,
                    longitude: 101.694_89,
                    ..Default::default()
                }),
                stop_id: Some("1003".to_string()),
                current_status: Some(1),
                congestion_level: Some(1),
                timestamp: Some(1_700_000_000),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let observations = decode(&bytes, received_at()).expect("should decode");
        assert_eq!(observations.len(), 1);

        let observation = &observations[0];
        assert_eq!(observation.vehicle_id, "VEH1");
        assert_eq!(observation.trip_id.as_deref(), Some("T789_1"));
        assert_eq!(observation.route_id.as_deref(), Some("T789"));
        assert_eq!(observation.latitude, Some(3.142_38));
        assert_eq!(observation.longitude, Some(101.694_89));
        assert_eq!(observation.stop_id.as_deref(), Some("1003"));
        assert_eq!(observation.current_status, Some(VehicleStatus::StoppedAt));
        assert_eq!(observation.congestion_level, Some(CongestionLevel::RunningSmoothly));
        assert_eq!(observation.timestamp, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    }

    #[test]
    fn sparse_entity() {
        let bytes = feed(vec![FeedEntity {
            id: "e2".to_string(),
            vehicle: Some(VehiclePosition::default()),
            ..Default::default()
        }]);

        let observations = decode(&bytes, received_at()).expect("should decode");
        let observation = &observations[0];
        assert_eq!(observation.vehicle_id, "e2");
        assert_eq!(observation.trip_id, None);
        assert_eq!(observation.latitude, None);
        assert_eq!(observation.current_status, None);
        assert_eq!(observation.timestamp, received_at());
    }

    #[test]
    fn skips_other_entities() {
        let bytes = feed(vec![
            FeedEntity { id: "alert".to_string(), ..Default::default() },
            FeedEntity {
                id: String::new(),
                vehicle: Some(VehiclePosition::default()),
                ..Default::default()
            },
        ]);

        assert!(decode(&bytes, received_at()).expect("should decode").is_empty());
    }

    #[test]
    fn empty_feed() {
        assert!(decode(&feed(vec![]), received_at()).expect("should decode").is_empty());
    }

    #[test]
    fn malformed() {
        let err = decode(&[0x0a, 0xff], received_at()).expect_err("should fail");
        assert!(matches!(err, Error::Decode(_)));
    }
}
