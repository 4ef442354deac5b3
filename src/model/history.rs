//! History synthesis
//!
//! Expands one quote into a fixed-length series of evenly spaced points
//! ending at "now". Each call is a fresh random scatter around the current
//! price: consecutive calls do not form a rolling window.

use super::{round_cents, sample_volume};
use crate::config::HistoryConfig;
use crate::feed::Quote;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One synthetic historical sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    /// Price in cents precision, never negative
    pub price: Decimal,
    pub volume: u64,
}

/// Builds [`HistoryPoint`] series from a quote
#[derive(Debug, Clone)]
pub struct HistorySynthesizer {
    length: usize,
    spacing: Duration,
    max_deviation: f64,
    volume_min: u64,
    volume_max: u64,
}

impl HistorySynthesizer {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            length: config.length,
            spacing: Duration::seconds(config.spacing_secs as i64),
            max_deviation: config.max_deviation,
            volume_min: config.volume_min,
            volume_max: config.volume_max,
        }
    }

    /// Synthesize the series for `quote`, oldest first, newest at `now`
    ///
    /// Returns an empty series when the quote has no usable price (NaN,
    /// infinite or zero); callers treat that as "no data yet".
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        quote: &Quote,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<HistoryPoint> {
        if !quote.has_usable_price() {
            return Vec::new();
        }

        let current = quote.price;
        (0..self.length)
            .rev()
            .map(|offset| {
                let deviation = (rng.random::<f64>() - 0.5) * 2.0 * self.max_deviation;
                let price = round_cents(current * (1.0 + deviation));
                let price = Decimal::try_from(price)
                    .unwrap_or(Decimal::ZERO)
                    .round_dp(2)
                    .max(Decimal::ZERO);

                HistoryPoint {
                    timestamp: now - self.spacing * offset as i32,
                    price,
                    volume: sample_volume(rng, self.volume_min, self.volume_max),
                }
            })
            .collect()
    }
}

impl Default for HistorySynthesizer {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}
