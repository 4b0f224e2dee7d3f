//! # Realtime Core
//!
//! Core modules shared by the static GTFS and vehicle feed crates: the error
//! taxonomy, transit categories, and the host-provided seams.

mod category;
mod error;
mod provider;

pub use crate::category::*;
pub use crate::error::*;
pub use crate::provider::*;
