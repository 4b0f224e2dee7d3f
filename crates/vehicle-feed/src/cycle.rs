//! # Feed Cycle
//!
//! One pass of fetch, decode, reconcile and persist for a category. Fetch
//! and decode failures leave the store untouched. Upserts are written before
//! demotion.

use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::Request;
use realtime::{Category, Error, HttpRequest, Result, bad_gateway};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::decoder::decode;
use crate::observation::VehicleRecord;
use crate::reconcile::{CycleReport, reconcile};
use crate::store::VehicleStore;

/// The state of a category after a completed cycle.
#[derive(Clone, Debug, Serialize)]
pub struct CycleOutcome {
    pub category: Category,
    pub completed_at: DateTime<Utc>,
    pub report: CycleReport,
    pub vehicles: Vec<VehicleRecord>,
}

impl CycleOutcome {
    #[must_use]
    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            category: self.category.clone(),
            completed_at: self.completed_at,
            report: self.report,
        }
    }
}

/// A completed cycle without the vehicle state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub category: Category,
    pub completed_at: DateTime<Utc>,
    pub report: CycleReport,
}

/// Fetch the raw feed.
///
/// # Errors
///
/// Returns [`Error::BadGateway`] when the request fails or the feed answers
/// with a non-success status.
pub async fn fetch_feed(http: &impl HttpRequest, url: &str) -> Result<Bytes> {
    let request = Request::get(url)
        .header("Accept", "application/x-protobuf")
        .body(Bytes::new())
        .context("building feed request")?;

    let response =
        http.fetch(request).await.map_err(|e| bad_gateway!("fetching {}: {:#}", url, e))?;
    if !response.status().is_success() {
        return Err(bad_gateway!("feed {} returned {}", url, response.status()));
    }

    Ok(response.into_body())
}

/// Run one cycle for `category`.
///
/// # Errors
///
/// Returns [`Error::BadGateway`] or [`Error::Decode`] when the feed cannot be
/// read, and [`Error::Persistence`] when the store fails.
pub async fn run_cycle(
    category: &Category, url: &str, http: &impl HttpRequest, store: &impl VehicleStore,
) -> Result<CycleOutcome> {
    let bytes = fetch_feed(http, url).await?;
    let observations = decode(&bytes, Utc::now()).inspect_err(|e| {
        error!(monotonic_counter.feed_decode_errors = 1, category = %category, "{e}");
    })?;
    debug!(
        category = %category,
        bytes = bytes.len(),
        observations = observations.len(),
        "feed decoded"
    );

    let current = store.get_all_vehicles(Some(category)).await.map_err(persistence)?;
    let reconciliation = reconcile(category, observations, &current);

    store.upsert_vehicles(&reconciliation.upserts).await.map_err(persistence)?;
    store.mark_inactive(category, &reconciliation.seen).await.map_err(persistence)?;

    let report = reconciliation.report;
    info!(
        monotonic_counter.feed_cycles = 1,
        gauge.active_vehicles = report.observed,
        category = %category,
        created = report.created,
        refreshed = report.refreshed,
        demoted = report.demoted,
        "feed cycle complete"
    );

    Ok(CycleOutcome {
        category: category.clone(),
        completed_at: Utc::now(),
        report,
        vehicles: reconciliation.state,
    })
}

fn persistence(err: anyhow::Error) -> Error {
    Error::Persistence(format!("{err:#}"))
}
