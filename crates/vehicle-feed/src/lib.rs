//! # Vehicle Feed
//!
//! Polls a GTFS-Realtime vehicle position feed and reconciles each batch of
//! observations into a durable vehicle set. Vehicles that stop reporting are
//! marked inactive rather than removed.

mod config;
mod cycle;
mod decoder;
mod observation;
mod reconcile;
mod scheduler;
mod store;

pub use self::config::*;
pub use self::cycle::*;
pub use self::decoder::*;
pub use self::observation::*;
pub use self::reconcile::*;
pub use self::scheduler::*;
pub use self::store::*;
