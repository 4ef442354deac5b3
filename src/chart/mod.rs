//! Chart module
//!
//! Read-only chart snapshots handed to renderers, axis range selection,
//! display formatting, and the SVG renderer

mod render;

pub use render::SvgChartRenderer;

use crate::model::ChartPoint;
use crate::polling::{FeedStatus, QuoteOrigin};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Chart rendering errors
#[derive(Debug, Error)]
pub enum ChartError {
    /// Drawing backend failure
    #[error("Render failed: {0}")]
    Render(String),
    /// Writing the output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a renderer needs for one frame
///
/// Built fresh by the owning feed on every read; renderers never mutate it.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub symbol: String,
    /// Indicator-annotated series, oldest first; empty while loading
    pub points: Vec<ChartPoint>,
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume_24h: Option<u64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub status: FeedStatus,
    /// Where the cached quote came from
    pub origin: Option<QuoteOrigin>,
    /// Cached quote is older than the freshness threshold
    pub is_stale: bool,
    /// When the cached quote was applied
    pub as_of: Option<DateTime<Utc>>,
}

impl ChartSnapshot {
    /// Snapshot for a symbol with nothing cached yet
    pub fn loading(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
            current_price: None,
            change: None,
            change_percent: None,
            volume_24h: None,
            high_24h: None,
            low_24h: None,
            status: FeedStatus::Loading,
            origin: None,
            is_stale: false,
            as_of: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    /// Change is zero or positive; a missing or NaN change counts as zero
    pub fn is_positive(&self) -> bool {
        self.change.filter(|c| c.is_finite()).unwrap_or(0.0) >= 0.0
    }

    /// Price axis range over every price-axis series, padded by `padding`
    pub fn price_domain(&self, padding: Decimal) -> Option<AxisDomain> {
        AxisDomain::for_prices(&self.points, padding)
    }

    /// Volume axis range, `[0, max volume]`
    pub fn volume_domain(&self) -> Option<(u64, u64)> {
        self.points.iter().map(|p| p.volume).max().map(|max| (0, max))
    }
}

/// Inclusive axis range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisDomain {
    pub min: Decimal,
    pub max: Decimal,
}

impl AxisDomain {
    /// Range of price, SMA, high and low across `points`, padded on both sides
    ///
    /// Computed from the data rather than the quote because synthetic high/low
    /// values do not have to bracket the series.
    pub fn for_prices(points: &[ChartPoint], padding: Decimal) -> Option<Self> {
        let values = points
            .iter()
            .flat_map(|p| [p.price, p.sma, p.high, p.low]);

        let (min, max) = values.fold(None, |acc: Option<(Decimal, Decimal)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

        Some(Self {
            min: min - padding,
            max: max + padding,
        })
    }

    pub fn span(&self) -> Decimal {
        self.max - self.min
    }
}

/// `$175.42`; non-finite values render as `$0.00`
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    format!("${:.2}", value)
}

/// `+1.23` / `-1.23`; non-finite values render as `0.00`
pub fn format_change(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    if value >= 0.0 {
        format!("+{:.2}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// `+1.23%` / `-1.23%`; non-finite values render as `0.00%`
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0.00%".to_string();
    }
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}
