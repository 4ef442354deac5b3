//! Polling module
//!
//! Per-symbol feeds that refresh their quote on a fixed timer, mask fetch
//! failures with synthetic quotes, and rebuild the history whenever a new
//! quote lands

mod coordinator;
mod symbol_feed;

pub use coordinator::{FeedSubscription, PollingCoordinator};
pub use symbol_feed::SymbolFeed;

use crate::config::Config;
use crate::model::{HistorySynthesizer, IndicatorCalculator, PriceGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a symbol feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// No quote cached yet; the initial fetch is in flight
    Loading,
    /// A quote is cached and served while refreshes run in the background
    Ready,
}

/// Where a cached quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteOrigin {
    /// Returned by the quote source
    Remote,
    /// Synthesized locally after the source failed
    Fallback,
}

/// Everything a feed needs besides its source and clock
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Local generator used when a fetch fails
    pub generator: Arc<PriceGenerator>,
    pub history: HistorySynthesizer,
    pub indicators: IndicatorCalculator,
    /// Period of the polling timer
    pub refresh_interval: Duration,
    /// Age after which a cached quote is flagged stale
    pub stale_after: chrono::Duration,
}

impl FeedSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            generator: Arc::new(PriceGenerator::new(config.generator.clone())),
            history: HistorySynthesizer::new(&config.history),
            indicators: IndicatorCalculator::new(&config.chart),
            refresh_interval: Duration::from_secs(config.polling.refresh_interval_secs.max(1)),
            stale_after: chrono::Duration::seconds(config.polling.stale_after_secs as i64),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
