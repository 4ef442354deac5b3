//! Per-symbol feed state
//!
//! A `SymbolFeed` exclusively owns one symbol's cached quote and history.
//! Fetches are independent: a new one never cancels an in-flight one, and
//! whichever resolves last overwrites the cache.

use super::{FeedSettings, FeedStatus, QuoteOrigin};
use crate::chart::ChartSnapshot;
use crate::clock::Clock;
use crate::feed::{Quote, QuoteSource};
use crate::model::HistoryPoint;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// Cached state behind the feed's lock
#[derive(Debug, Default)]
struct FeedState {
    quote: Option<Quote>,
    origin: Option<QuoteOrigin>,
    history: Arc<Vec<HistoryPoint>>,
    applied_at: Option<DateTime<Utc>>,
}

/// One symbol's polling context
pub struct SymbolFeed {
    symbol: String,
    source: Arc<dyn QuoteSource>,
    settings: FeedSettings,
    clock: Arc<dyn Clock>,
    state: RwLock<FeedState>,
    rng: Mutex<StdRng>,
    /// Bumped every time a quote is applied
    updates: watch::Sender<u64>,
}

impl SymbolFeed {
    pub fn new(
        symbol: impl Into<String>,
        source: Arc<dyn QuoteSource>,
        settings: FeedSettings,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            symbol: symbol.into(),
            source,
            settings,
            clock,
            state: RwLock::new(FeedState::default()),
            rng: Mutex::new(rng),
            updates,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Receiver notified each time a new quote is applied
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    /// Fetch a quote from the source, or synthesize one if the fetch fails
    pub async fn fetch_quote(&self) -> (Quote, QuoteOrigin) {
        let started = Instant::now();
        let result = self.source.fetch(&self.symbol).await;
        telemetry::record_latency(LatencyMetric::QuoteFetch, &self.symbol, started.elapsed());

        match result {
            Ok(quote) => {
                telemetry::increment(CounterMetric::QuoteFetches, &self.symbol);
                (quote, QuoteOrigin::Remote)
            }
            Err(e) => {
                tracing::warn!(
                    symbol = %self.symbol,
                    error = %e,
                    "Quote fetch failed, using synthetic quote"
                );
                telemetry::increment(CounterMetric::FallbackQuotes, &self.symbol);
                let quote = self
                    .settings
                    .generator
                    .quote(&self.symbol, self.clock.now(), &mut *self.rng());
                (quote, QuoteOrigin::Fallback)
            }
        }
    }

    /// Cache `quote` and rebuild the history from it
    ///
    /// A quote without a usable price is still cached, but the previous
    /// history is kept since nothing can be synthesized from it.
    pub async fn apply(&self, quote: Quote, origin: QuoteOrigin) {
        let now = self.clock.now();
        let history = self
            .settings
            .history
            .synthesize(&quote, now, &mut *self.rng());

        let price = quote.price;
        {
            let mut state = self.state.write().await;
            state.quote = Some(quote);
            state.origin = Some(origin);
            state.applied_at = Some(now);
            if !history.is_empty() {
                state.history = Arc::new(history);
                telemetry::increment(CounterMetric::HistoryRegenerations, &self.symbol);
            }
        }

        if price.is_finite() {
            telemetry::set_gauge(GaugeMetric::QuotePrice, Some(&self.symbol), price);
        }
        tracing::debug!(symbol = %self.symbol, price, ?origin, "Applied quote");

        self.updates.send_modify(|generation| *generation += 1);
    }

    /// One fetch-and-apply cycle
    pub async fn refresh(&self) {
        let (quote, origin) = self.fetch_quote().await;
        self.apply(quote, origin).await;
    }

    /// Run a refresh in the background; the caller does not wait for it
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        tokio::spawn(async move {
            feed.refresh().await;
        })
    }

    pub async fn status(&self) -> FeedStatus {
        if self.state.read().await.quote.is_some() {
            FeedStatus::Ready
        } else {
            FeedStatus::Loading
        }
    }

    /// Latest cached quote
    pub async fn quote(&self) -> Option<Quote> {
        self.state.read().await.quote.clone()
    }

    /// Latest synthesized history, shared read-only
    pub async fn history(&self) -> Arc<Vec<HistoryPoint>> {
        Arc::clone(&self.state.read().await.history)
    }

    /// Whether the cached quote has reached the freshness threshold
    pub async fn is_stale(&self) -> bool {
        let applied_at = self.state.read().await.applied_at;
        self.stale_since(applied_at)
    }

    /// Build a chart snapshot from the cached state
    ///
    /// Indicators are recomputed on every call.
    pub async fn snapshot(&self) -> ChartSnapshot {
        let (quote, origin, history, applied_at) = {
            let state = self.state.read().await;
            (
                state.quote.clone(),
                state.origin,
                Arc::clone(&state.history),
                state.applied_at,
            )
        };

        let points = self
            .settings
            .indicators
            .annotate(&history, &mut *self.rng());

        let Some(quote) = quote else {
            return ChartSnapshot::loading(self.symbol.clone());
        };

        ChartSnapshot {
            symbol: self.symbol.clone(),
            points,
            current_price: Some(quote.price),
            change: Some(quote.change),
            change_percent: Some(quote.change_percent),
            volume_24h: Some(quote.volume),
            high_24h: Some(quote.high),
            low_24h: Some(quote.low),
            status: FeedStatus::Ready,
            origin,
            is_stale: self.stale_since(applied_at),
            as_of: applied_at,
        }
    }

    fn stale_since(&self, applied_at: Option<DateTime<Utc>>) -> bool {
        applied_at
            .map(|at| self.clock.now() - at >= self.settings.stale_after)
            .unwrap_or(false)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}
