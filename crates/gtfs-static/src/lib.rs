//! # Static GTFS
//!
//! Parses a category's static GTFS tables, indexes trips by shape and stop
//! sequence, and rebuilds route polylines for display.

mod route_shape;
mod routes;
mod shapes;
mod snapshot;
mod source;
mod stop_times;
mod stops;
mod table;
mod trip_ids;
mod trip_index;
mod trips;

pub use self::route_shape::*;
pub use self::routes::*;
pub use self::shapes::*;
pub use self::snapshot::*;
pub use self::source::*;
pub use self::stop_times::*;
pub use self::stops::*;
pub use self::table::*;
pub use self::trip_ids::*;
pub use self::trip_index::*;
pub use self::trips::*;
