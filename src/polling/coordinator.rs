//! Polling coordinator
//!
//! Registry of symbol feeds keyed by upper-cased symbol. The first
//! subscription to a symbol creates its feed and starts its timer; dropping
//! the last subscription stops the timer and removes the feed. Fetches
//! already in flight when a feed is torn down still complete, but nothing
//! reads their result.

use super::{FeedSettings, SymbolFeed};
use crate::chart::ChartSnapshot;
use crate::clock::{Clock, SystemClock};
use crate::feed::QuoteSource;
use crate::telemetry::{self, GaugeMetric};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

struct FeedEntry {
    feed: Arc<SymbolFeed>,
    subscribers: usize,
    timer: JoinHandle<()>,
}

/// Owns one [`SymbolFeed`] and one polling timer per subscribed symbol
pub struct PollingCoordinator {
    source: Arc<dyn QuoteSource>,
    settings: FeedSettings,
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
    feeds: Mutex<HashMap<String, FeedEntry>>,
}

impl PollingCoordinator {
    pub fn new(settings: FeedSettings, source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            settings,
            clock: Arc::new(SystemClock),
            seed: None,
            feeds: Mutex::new(HashMap::new()),
        }
    }

    /// Use `clock` for every feed created from now on
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Derive each feed's RNG from `seed` instead of OS entropy
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Subscribe to `symbol`, starting its feed if this is the first subscriber
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(self: &Arc<Self>, symbol: &str) -> FeedSubscription {
        let key = normalize(symbol);
        let mut feeds = self.feeds();

        let entry = feeds.entry(key.clone()).or_insert_with(|| {
            let feed = Arc::new(SymbolFeed::new(
                key.clone(),
                Arc::clone(&self.source),
                self.settings.clone(),
                Arc::clone(&self.clock),
                self.rng_for(&key),
            ));
            let timer = spawn_timer(Arc::clone(&feed), self.settings.refresh_interval);
            tracing::info!(
                symbol = %key,
                interval_secs = self.settings.refresh_interval.as_secs(),
                "Started polling"
            );
            FeedEntry {
                feed,
                subscribers: 0,
                timer,
            }
        });
        entry.subscribers += 1;

        let feed = Arc::clone(&entry.feed);
        let active = feeds.len();
        drop(feeds);

        telemetry::set_gauge(GaugeMetric::ActiveSymbols, None, active as f64);

        FeedSubscription {
            coordinator: Arc::clone(self),
            updates: feed.updates(),
            key,
            feed,
        }
    }

    /// Symbols with at least one subscriber, sorted
    pub fn active_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.feeds().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn subscriber_count(&self, symbol: &str) -> usize {
        self.feeds()
            .get(&normalize(symbol))
            .map(|entry| entry.subscribers)
            .unwrap_or(0)
    }

    /// Feed for `symbol`, if it has subscribers
    pub fn feed(&self, symbol: &str) -> Option<Arc<SymbolFeed>> {
        self.feeds()
            .get(&normalize(symbol))
            .map(|entry| Arc::clone(&entry.feed))
    }

    fn release(&self, key: &str) {
        let mut feeds = self.feeds();
        let Some(entry) = feeds.get_mut(key) else {
            return;
        };

        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 {
            if let Some(entry) = feeds.remove(key) {
                entry.timer.abort();
                tracing::info!(symbol = %key, "Stopped polling");
            }
        }

        let active = feeds.len();
        drop(feeds);
        telemetry::set_gauge(GaugeMetric::ActiveSymbols, None, active as f64);
    }

    fn rng_for(&self, key: &str) -> StdRng {
        match self.seed {
            Some(seed) => {
                let salt = key
                    .bytes()
                    .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)));
                StdRng::seed_from_u64(seed ^ salt)
            }
            None => StdRng::from_os_rng(),
        }
    }

    fn feeds(&self) -> MutexGuard<'_, HashMap<String, FeedEntry>> {
        self.feeds.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle to a subscribed symbol; dropping it unsubscribes
pub struct FeedSubscription {
    coordinator: Arc<PollingCoordinator>,
    key: String,
    feed: Arc<SymbolFeed>,
    updates: watch::Receiver<u64>,
}

impl FeedSubscription {
    pub fn symbol(&self) -> &str {
        &self.key
    }

    pub fn feed(&self) -> &Arc<SymbolFeed> {
        &self.feed
    }

    /// Current chart snapshot for this symbol
    pub async fn snapshot(&self) -> ChartSnapshot {
        self.feed.snapshot().await
    }

    /// Wait until a new quote has been applied since the last call
    pub async fn changed(&mut self) {
        // the sender lives in `self.feed`, so this never errors
        let _ = self.updates.changed().await;
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.coordinator.release(&self.key);
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Fire a background refresh on every tick; the first tick is immediate
fn spawn_timer(feed: Arc<SymbolFeed>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            tracing::debug!(symbol = %feed.symbol(), "Polling tick");
            feed.spawn_refresh();
        }
    })
}
