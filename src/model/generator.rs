//! Synthetic price generator
//!
//! price = base + A_slow·sin(t / P_slow) + A_fast·sin(t / P_fast) + noise
//!
//! where `t` is seconds since the Unix epoch and noise is uniform in
//! `[-noise/2, noise/2)`. High/low are offset from price by a fraction of
//! |change| plus independent jitter, so they need not bracket the price.

use super::{round_cents, sample_volume};
use crate::config::GeneratorConfig;
use crate::feed::Quote;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;

/// Produces synthetic quotes from per-symbol base prices
#[derive(Debug, Clone)]
pub struct PriceGenerator {
    config: GeneratorConfig,
    /// Base prices keyed by upper-cased symbol
    base_prices: HashMap<String, f64>,
}

impl PriceGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let base_prices = config
            .base_prices
            .iter()
            .map(|(symbol, price)| (symbol.to_uppercase(), *price))
            .collect();

        Self {
            config,
            base_prices,
        }
    }

    /// Base price for `symbol`, or the configured default for unknown symbols
    pub fn base_price(&self, symbol: &str) -> f64 {
        self.base_prices
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(self.config.default_base_price)
    }

    /// Generate a quote for `symbol` at `now`
    pub fn quote<R: Rng + ?Sized>(&self, symbol: &str, now: DateTime<Utc>, rng: &mut R) -> Quote {
        let cfg = &self.config;
        let base = self.base_price(symbol);
        let t = now.timestamp_millis() as f64 / 1000.0;

        let slow = oscillation(t, cfg.slow_period_secs) * cfg.slow_amplitude;
        let fast = oscillation(t, cfg.fast_period_secs) * cfg.fast_amplitude;
        let noise = (rng.random::<f64>() - 0.5) * cfg.noise_amplitude;

        let change = slow + fast + noise;
        let price = base + change;
        let change_percent = if base != 0.0 {
            change / base * 100.0
        } else {
            0.0
        };

        let spread = change.abs() * cfg.high_low_spread;
        let high = price + spread + rng.random::<f64>();
        let low = price - spread - rng.random::<f64>();

        Quote {
            symbol: symbol.to_string(),
            price: round_cents(price),
            change: round_cents(change),
            change_percent: round_cents(change_percent),
            volume: sample_volume(rng, cfg.volume_min, cfg.volume_max),
            high: round_cents(high),
            low: round_cents(low),
            previous_close: round_cents(base),
            timestamp: now,
        }
    }
}

impl Default for PriceGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// sin(t / period); a non-positive period contributes nothing
fn oscillation(t: f64, period: f64) -> f64 {
    if period > 0.0 {
        (t / period).sin()
    } else {
        0.0
    }
}
