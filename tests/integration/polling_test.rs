//! Integration tests for per-symbol polling and the coordinator

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stock_feed::clock::{Clock, ManualClock};
use stock_feed::feed::{FeedError, Quote, QuoteSource};
use stock_feed::polling::{FeedSettings, FeedStatus, PollingCoordinator, QuoteOrigin, SymbolFeed};
use tokio::sync::oneshot;

fn quote(price: f64) -> Quote {
    Quote {
        symbol: "GOOGL".to_string(),
        price,
        change: 0.4,
        change_percent: 0.23,
        volume: 16_500_000,
        high: price + 0.8,
        low: price - 0.8,
        previous_close: price - 0.4,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
    }
}

/// Answers the n-th fetch with whatever is sent on the n-th channel
struct ScriptedSource {
    responses: Mutex<VecDeque<oneshot::Receiver<Quote>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Quote>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) = (0..count).map(|_| oneshot::channel()).unzip();
        let source = Arc::new(Self {
            responses: Mutex::new(receivers),
            calls: AtomicUsize::new(0),
        });
        (source, senders)
    }

    async fn wait_for_calls(&self, n: usize) {
        while self.calls.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    async fn fetch(&self, _symbol: &str) -> Result<Quote, FeedError> {
        let next = self.responses.lock().unwrap().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match next {
            Some(rx) => rx.await.map_err(|_| FeedError::Decode("dropped".to_string())),
            None => Err(FeedError::Decode("script exhausted".to_string())),
        }
    }
}

/// Counts fetches and always fails
#[derive(Default)]
struct CountingFailure {
    calls: AtomicUsize,
}

#[async_trait]
impl QuoteSource for CountingFailure {
    async fn fetch(&self, _symbol: &str) -> Result<Quote, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FeedError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
    ))
}

#[tokio::test]
async fn test_last_resolved_fetch_wins() {
    let (source, mut senders) = ScriptedSource::new(2);
    let feed = Arc::new(SymbolFeed::new(
        "GOOGL",
        source.clone(),
        FeedSettings::default(),
        clock(),
        StdRng::seed_from_u64(3),
    ));
    let mut updates = feed.updates();

    let first = feed.spawn_refresh();
    source.wait_for_calls(1).await;
    let second = feed.spawn_refresh();
    source.wait_for_calls(2).await;

    let tx_second = senders.pop().unwrap();
    let tx_first = senders.pop().unwrap();

    // the later request resolves first
    tx_second.send(quote(101.0)).unwrap();
    second.await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(feed.quote().await.unwrap().price, 101.0);

    // the earlier one lands afterwards and overwrites it
    tx_first.send(quote(100.0)).unwrap();
    first.await.unwrap();
    assert_eq!(feed.quote().await.unwrap().price, 100.0);

    let history = feed.history().await;
    assert_eq!(history.len(), 50);
    let last = history.last().unwrap().price;
    assert!(last >= rust_decimal_macros::dec!(99) && last <= rust_decimal_macros::dec!(101));
}

#[tokio::test]
async fn test_failures_are_masked_by_fallback() {
    let source = Arc::new(CountingFailure::default());
    let feed = SymbolFeed::new(
        "AMZN",
        source.clone(),
        FeedSettings::default(),
        clock(),
        StdRng::seed_from_u64(9),
    );

    feed.refresh().await;
    feed.refresh().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.status, FeedStatus::Ready);
    assert_eq!(snapshot.origin, Some(QuoteOrigin::Fallback));
    assert_eq!(snapshot.points.len(), 50);

    let price = snapshot.current_price.unwrap();
    assert!((price - 185.21).abs() < 5.0);
}

#[tokio::test]
async fn test_snapshot_reflects_clock() {
    let clock = clock();
    let (source, mut senders) = ScriptedSource::new(1);
    let feed = SymbolFeed::new(
        "GOOGL",
        source,
        FeedSettings::default(),
        clock.clone(),
        StdRng::seed_from_u64(5),
    );

    senders.remove(0).send(quote(175.0)).unwrap();
    feed.refresh().await;

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.as_of, Some(clock.now()));
    assert_eq!(snapshot.points.last().unwrap().timestamp, clock.now());
    assert!(!snapshot.is_stale);

    clock.advance(chrono::Duration::seconds(40));
    assert!(feed.snapshot().await.is_stale);
}

#[tokio::test]
async fn test_coordinator_polls_until_last_unsubscribe() {
    let source = Arc::new(CountingFailure::default());
    let mut settings = FeedSettings::default();
    settings.refresh_interval = Duration::from_millis(10);
    let coordinator = Arc::new(PollingCoordinator::new(settings, source.clone()).with_seed(Some(11)));

    let mut a = coordinator.subscribe("CRCL");
    let b = coordinator.subscribe("crcl");
    assert_eq!(coordinator.subscriber_count("CRCL"), 2);

    a.changed().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(source.calls.load(Ordering::SeqCst) >= 2);

    drop(a);
    let before = source.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(source.calls.load(Ordering::SeqCst) > before);

    drop(b);
    assert!(coordinator.active_symbols().is_empty());
    tokio::time::sleep(Duration::from_millis(20)).await;
    let stopped = source.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), stopped);
}

#[tokio::test]
async fn test_seeded_coordinators_agree() {
    async fn first_history(seed: u64) -> Vec<rust_decimal::Decimal> {
        let clock = clock();
        let source = Arc::new(CountingFailure::default());
        let coordinator = Arc::new(
            PollingCoordinator::new(FeedSettings::default(), source)
                .with_clock(clock)
                .with_seed(Some(seed)),
        );
        let mut sub = coordinator.subscribe("GOOGL");
        sub.changed().await;
        sub.feed().history().await.iter().map(|p| p.price).collect()
    }

    assert_eq!(first_history(21).await, first_history(21).await);
}
