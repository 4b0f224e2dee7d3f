use std::env;
use std::path::PathBuf;

use vehicle_feed::FeedConfig;

/// Service settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub static_dir: PathBuf,
    pub listen_addr: String,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        let static_dir = env::var("GTFS_STATIC_DIR").map_or_else(
            |_| {
                tracing::trace!("GTFS_STATIC_DIR not set, using default: ./gtfs");
                PathBuf::from("./gtfs")
            },
            PathBuf::from,
        );
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| {
            let default = "0.0.0.0:8080".to_string();
            tracing::trace!("LISTEN_ADDR not set, using default: {default}");
            default
        });

        Self { feed: FeedConfig::from_env(), static_dir, listen_addr }
    }
}
