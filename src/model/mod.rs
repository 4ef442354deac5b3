//! Market data model module
//!
//! Pure transforms from a symbol and a clock reading to a quote, from a
//! quote to a synthetic history, and from a history to chart points. All
//! randomness is drawn from a caller-supplied [`rand::Rng`].

mod generator;
mod history;
mod indicators;

pub use generator::PriceGenerator;
pub use history::{HistoryPoint, HistorySynthesizer};
pub use indicators::{simple_moving_average, ChartPoint, IndicatorCalculator};

use rand::Rng;

/// Round to whole cents
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Uniform integer in `[min, max]`; a degenerate band yields `min`
pub(crate) fn sample_volume<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}
