//! # Feed Scheduler
//!
//! Runs a feed cycle for every configured category on a fixed interval. A
//! cycle always completes, persistence included, before the next begins;
//! ticks missed while a cycle runs long are skipped rather than queued.
//! Each completed cycle is published on its category's channel, so one
//! category's outcome never hides another's.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use realtime::{Category, HttpRequest, Result};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::config::FeedConfig;
use crate::cycle::{CycleOutcome, run_cycle};
use crate::store::VehicleStore;

/// The latest completed cycle of a category, if any.
pub type CycleReceiver = watch::Receiver<Option<Arc<CycleOutcome>>>;

/// A category and the URL its feed is fetched from.
#[derive(Clone, Debug)]
pub struct FeedTarget {
    pub category: Category,
    pub url: String,
}

pub struct FeedScheduler<H, S> {
    targets: Vec<FeedTarget>,
    interval: Duration,
    http: Arc<H>,
    store: Arc<S>,
    senders: HashMap<Category, watch::Sender<Option<Arc<CycleOutcome>>>>,
}

impl<H: HttpRequest, S: VehicleStore> FeedScheduler<H, S> {
    #[must_use]
    pub fn new(config: &FeedConfig, http: Arc<H>, store: Arc<S>) -> Self {
        let targets = config
            .categories
            .iter()
            .map(|category| FeedTarget {
                category: category.clone(),
                url: config.feed_url(category),
            })
            .collect();
        let senders = config
            .categories
            .iter()
            .map(|category| (category.clone(), watch::channel(None).0))
            .collect();

        Self { targets, interval: config.poll_interval, http, store, senders }
    }

    /// Subscribe to a category's completed cycles. `None` when the category
    /// is not polled.
    #[must_use]
    pub fn subscribe(&self, category: &Category) -> Option<CycleReceiver> {
        self.senders.get(category).map(watch::Sender::subscribe)
    }

    /// Subscribe to every polled category.
    #[must_use]
    pub fn subscribe_all(&self) -> HashMap<Category, CycleReceiver> {
        self.senders
            .iter()
            .map(|(category, sender)| (category.clone(), sender.subscribe()))
            .collect()
    }

    #[must_use]
    pub fn targets(&self) -> &[FeedTarget] {
        &self.targets
    }

    /// Run one cycle per category, in order. Failed cycles are logged and
    /// leave the category's vehicles as they were.
    pub async fn run_once(&self) -> Vec<Result<Arc<CycleOutcome>>> {
        let mut results = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let result =
                run_cycle(&target.category, &target.url, self.http.as_ref(), self.store.as_ref())
                    .await
                    .map(Arc::new);

            match &result {
                Ok(outcome) => {
                    if let Some(sender) = self.senders.get(&target.category) {
                        sender.send_replace(Some(Arc::clone(outcome)));
                    }
                }
                Err(e) => {
                    error!(
                        monotonic_counter.feed_cycle_errors = 1,
                        category = %target.category,
                        "feed cycle failed: {e}"
                    );
                }
            }
            results.push(result);
        }

        results
    }

    /// Poll forever.
    pub async fn run(self) {
        info!(interval = ?self.interval, categories = self.targets.len(), "feed scheduler started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }
}
