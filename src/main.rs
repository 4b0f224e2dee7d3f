use std::sync::Arc;

use anyhow::{Context, Result};
use gtfs_static::{DirectorySource, StaticSource};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};
use tracker::{Config, Provider, Tracker, router};
use vehicle_feed::{FeedScheduler, MemoryStore, VehicleStore};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default().with(filter).with(fmt::layer()).init();

    let config = Config::from_env();
    let store = Arc::new(MemoryStore::new());
    let source: Arc<dyn StaticSource> = Arc::new(DirectorySource::new(&config.static_dir));
    let vehicles: Arc<dyn VehicleStore> = Arc::clone(&store) as Arc<dyn VehicleStore>;

    let provider = Arc::new(Provider::new(config.feed.timeout)?);
    let scheduler = FeedScheduler::new(&config.feed, provider, store);
    let tracker =
        Arc::new(Tracker::new(source, vehicles).with_cycles(scheduler.subscribe_all()));

    let reports = tracker.refresh_all(&config.feed.categories).await;
    info!(loaded = reports.len(), categories = config.feed.categories.len(), "static data loaded");

    let poller = tokio::spawn(scheduler.run());

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, router(tracker))
        .with_graceful_shutdown(shutdown())
        .await
        .context("serving HTTP")?;

    poller.abort();
    Ok(())
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("listening for shutdown signal: {e}");
    }
    info!("shutting down");
}
