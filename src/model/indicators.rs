//! Chart indicators
//!
//! Annotates a history with derived OHLC, a trailing simple moving average
//! and a cosmetic oscillator.
//!
//! The OHLC variation and the oscillator noise are drawn fresh on every
//! call, so annotating the same history twice gives different open/high/low
//! and oscillator values. The SMA is exact and repeatable. The oscillator
//! is a smooth wave plus noise (roughly 25..75), not an RSI computed from
//! price deltas, and is not clamped.

use super::HistoryPoint;
use crate::config::ChartConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Oscillator centre line
const OSCILLATOR_BASE: f64 = 45.0;
/// Oscillator wave amplitude
const OSCILLATOR_AMPLITUDE: f64 = 20.0;
/// Oscillator wave frequency per point
const OSCILLATOR_FREQUENCY: f64 = 0.3;
/// Oscillator noise width
const OSCILLATOR_NOISE: f64 = 10.0;
/// Fraction of |variation| used for the high/low wicks
const WICK_FACTOR: Decimal = dec!(0.8);

/// A history point enriched for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Position in the series, oldest = 0
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// Axis label, `hh:mm AM/PM`
    pub time_label: String,
    pub price: Decimal,
    pub volume: u64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Trailing simple moving average
    pub sma: Decimal,
    pub oscillator: f64,
}

/// Trailing simple moving average
///
/// Element `i` is the mean of `prices[i + 1 - min(i + 1, window)..=i]`: the
/// window widens from one point up to `window` points. No look-ahead.
pub fn simple_moving_average(prices: &[Decimal], window: usize) -> Vec<Decimal> {
    let window = window.max(1);
    let mut sum = Decimal::ZERO;
    let mut averages = Vec::with_capacity(prices.len());

    for (i, price) in prices.iter().enumerate() {
        sum += *price;
        if i >= window {
            sum -= prices[i - window];
        }
        let count = (i + 1).min(window);
        averages.push(sum / Decimal::from(count));
    }

    averages
}

/// Derives [`ChartPoint`]s from a history
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    sma_window: usize,
    variation: f64,
}

impl IndicatorCalculator {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            sma_window: config.sma_window,
            variation: config.variation,
        }
    }

    /// Annotate every point of `history`; empty in, empty out
    pub fn annotate<R: Rng + ?Sized>(&self, history: &[HistoryPoint], rng: &mut R) -> Vec<ChartPoint> {
        let prices: Vec<Decimal> = history.iter().map(|p| p.price).collect();
        let sma = simple_moving_average(&prices, self.sma_window);

        history
            .iter()
            .zip(sma)
            .enumerate()
            .map(|(index, (point, sma))| {
                let v = (rng.random::<f64>() - 0.5) * self.variation;
                let v = Decimal::try_from(v).unwrap_or(Decimal::ZERO).round_dp(4);
                let wick = v.abs() * WICK_FACTOR;
                let price = point.price;

                ChartPoint {
                    index,
                    timestamp: point.timestamp,
                    time_label: point.timestamp.format("%I:%M %p").to_string(),
                    price,
                    volume: point.volume,
                    open: (price - v).max(Decimal::ZERO),
                    high: price.max(price + wick),
                    low: price.min(price - wick),
                    close: price,
                    sma,
                    oscillator: oscillator(index, rng),
                }
            })
            .collect()
    }
}

impl Default for IndicatorCalculator {
    fn default() -> Self {
        Self::new(&ChartConfig::default())
    }
}

fn oscillator<R: Rng + ?Sized>(index: usize, rng: &mut R) -> f64 {
    OSCILLATOR_BASE
        + (index as f64 * OSCILLATOR_FREQUENCY).sin() * OSCILLATOR_AMPLITUDE
        + rng.random::<f64>() * OSCILLATOR_NOISE
}
