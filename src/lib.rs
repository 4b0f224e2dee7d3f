//! # Tracker
//!
//! Live transit vehicle tracking: reconciles a GTFS-Realtime vehicle feed
//! into a durable vehicle set and serves vehicles, routes, stops and shapes
//! from the static GTFS dataset.

mod config;
mod http;
mod provider;
mod query;

pub use self::config::Config;
pub use self::http::router;
pub use self::provider::Provider;
pub use self::query::Tracker;
