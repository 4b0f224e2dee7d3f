
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use realtime::{Category, Error};
use vehicle_feed::{
    CycleReport, FeedConfig, FeedScheduler, MemoryStore, VehicleStore, run_cycle,
};

use self::provider::{FailingStore, MockProvider, feed};

const URL: &str = "http://feed.test/vehicle-position?category=rapid-bus-mrtfeeder";

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

async fn states(store: &MemoryStore) -> Vec<(String, bool, DateTime<Utc>)> {
    store
        .get_all_vehicles(None)
        .await
        .expect("should list")
        .into_iter()
        .map(|r| (r.vehicle_id().to_string(), r.is_active, r.last_seen))
        .collect()
}

#[tokio::test]
async fn absent_vehicle_becomes_inactive() {
    let provider = MockProvider::default();
    let store = MemoryStore::new();
    let category = Category::mrt_feeder();

    provider.respond(URL, 200, feed(&[("V1", "T1"), ("V2", "T2")], 1_700_000_000));
    run_cycle(&category, URL, &provider, &store).await.expect("first cycle");

    provider.respond(URL, 200, feed(&[("V1", "T1")], 1_700_000_030));
    let outcome = run_cycle(&category, URL, &provider, &store).await.expect("second cycle");

    assert_eq!(outcome.report, CycleReport { observed: 1, created: 0, refreshed: 1, demoted: 1 });
    assert_eq!(states(&store).await, vec![
        ("V1".to_string(), true, at(1_700_000_030)),
        ("V2".to_string(), false, at(1_700_000_000)),
    ]);
}

#[tokio::test]
async fn empty_feed_demotes_all() {
    let provider = MockProvider::default();
    let store = MemoryStore::new();
    let category = Category::mrt_feeder();

    provider.respond(URL, 200, feed(&[("V1", "T1"), ("V2", "T2")], 1_700_000_000));
    run_cycle(&category, URL, &provider, &store).await.expect("first cycle");

    provider.respond(URL, 200, feed(&[], 0));
    let outcome = run_cycle(&category, URL, &provider, &store).await.expect("second cycle");

    assert_eq!(outcome.report.demoted, 2);
    let vehicles = store.get_all_vehicles(Some(&category)).await.expect("should list");
    assert_eq!(vehicles.len(), 2);
    assert!(vehicles.iter().all(|v| !v.is_active));
}

#[tokio::test]
async fn malformed_feed_leaves_store() {
    let provider = MockProvider::default();
    let store = MemoryStore::new();
    let category = Category::mrt_feeder();

    provider.respond(URL, 200, feed(&[("V1", "T1")], 1_700_000_000));
    run_cycle(&category, URL, &provider, &store).await.expect("first cycle");
    let before = states(&store).await;

    provider.respond(URL, 200, vec![0x0a, 0xff]);
    let err = run_cycle(&category, URL, &provider, &store).await.expect_err("should fail");

    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(states(&store).await, before);
}

#[tokio::test]
async fn upstream_failures() {
    let provider = MockProvider::default();
    let store = MemoryStore::new();
    let category = Category::mrt_feeder();

    provider.respond(URL, 503, "unavailable");
    let err = run_cycle(&category, URL, &provider, &store).await.expect_err("should fail");
    assert!(matches!(err, Error::BadGateway(_)));

    let err = run_cycle(&category, "http://feed.test/other", &provider, &store)
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::BadGateway(_)));

    assert!(states(&store).await.is_empty());
}

#[tokio::test]
async fn store_failure() {
    let provider = MockProvider::default();
    provider.respond(URL, 200, feed(&[("V1", "T1")], 1_700_000_000));

    let err = run_cycle(&Category::mrt_feeder(), URL, &provider, &FailingStore)
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::Persistence(ref msg) if msg.contains("disk full")));
}

fn config() -> FeedConfig {
    FeedConfig {
        base_url: "http://feed.test/vehicle-position".to_string(),
        categories: vec![Category::mrt_feeder(), Category::kl()],
        poll_interval: Duration::from_millis(10),
        timeout: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn scheduler_runs_each_category() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryStore::new());
    provider.respond(URL, 200, feed(&[("V1", "T1")], 1_700_000_000));

    let scheduler = FeedScheduler::new(&config(), Arc::clone(&provider), Arc::clone(&store));
    let mrt = scheduler.subscribe(&Category::mrt_feeder()).expect("mrt feeder is polled");
    let kl = scheduler.subscribe(&Category::kl()).expect("kl is polled");
    let rail = "rapid-rail".parse::<Category>().expect("should parse");
    assert!(scheduler.subscribe(&rail).is_none());
    let results = scheduler.run_once().await;

    // the KL feed has no canned response
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::BadGateway(_))));
    assert_eq!(provider.requests(), vec![
        URL.to_string(),
        "http://feed.test/vehicle-position?category=rapid-bus-kl".to_string()
    ]);

    let latest = mrt.borrow().clone().expect("should publish");
    assert_eq!(latest.category, Category::mrt_feeder());
    assert_eq!(latest.vehicles.len(), 1);
    assert!(kl.borrow().is_none());
}

#[tokio::test]
async fn each_category_keeps_its_outcome() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryStore::new());
    provider.respond(URL, 200, feed(&[("V1", "T1"), ("V2", "T2")], 1_700_000_000));
    provider.respond(
        "http://feed.test/vehicle-position?category=rapid-bus-kl",
        200,
        feed(&[("K1", "300_0")], 1_700_000_000),
    );

    let scheduler = FeedScheduler::new(&config(), provider, store);
    let mut receivers = scheduler.subscribe_all();
    scheduler.run_once().await;

    let mut mrt = receivers.remove(&Category::mrt_feeder()).expect("mrt feeder is polled");
    let mut kl = receivers.remove(&Category::kl()).expect("kl is polled");
    assert!(mrt.has_changed().expect("sender alive"));
    assert!(kl.has_changed().expect("sender alive"));

    let mrt = mrt.borrow_and_update().clone().expect("should publish");
    let kl = kl.borrow_and_update().clone().expect("should publish");
    assert_eq!((mrt.category.clone(), mrt.report.observed), (Category::mrt_feeder(), 2));
    assert_eq!((kl.category.clone(), kl.report.observed), (Category::kl(), 1));
}

#[tokio::test]
async fn scheduler_publishes() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryStore::new());
    provider.respond(URL, 200, feed(&[("V1", "T1"), ("V2", "T2")], 1_700_000_000));

    let scheduler = FeedScheduler::new(&config(), provider, Arc::clone(&store));
    let mut receiver = scheduler.subscribe(&Category::mrt_feeder()).expect("mrt feeder is polled");
    let handle = tokio::spawn(scheduler.run());

    tokio::time::timeout(Duration::from_secs(5), receiver.changed())
        .await
        .expect("should publish in time")
        .expect("sender alive");
    handle.abort();

    let latest = receiver.borrow().clone().expect("should publish");
    assert_eq!(latest.report.observed, 2);
    assert_eq!(store.get_all_vehicles(None).await.expect("should list").len(), 2);
}
