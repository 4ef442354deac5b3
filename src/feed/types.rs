//! Quote types and the realtime wire payload

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single market snapshot for a symbol
///
/// Serializes to the realtime endpoint's JSON shape (camelCase fields,
/// millisecond timestamp). `high`/`low` are not guaranteed to bracket
/// `price`, and any float may be NaN when decoded from a malformed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Whether the price can seed a history (finite and non-zero)
    pub fn has_usable_price(&self) -> bool {
        self.price.is_finite() && self.price != 0.0
    }
}

/// Lenient decoding of `GET /api/stocks/:symbol/realtime`
///
/// Every numeric field is accepted as a JSON number or a numeric string.
/// Missing or unparseable values decode as NaN rather than failing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RealtimePayload {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    change: Value,
    #[serde(default)]
    change_percent: Value,
    #[serde(default)]
    volume: Value,
    #[serde(default)]
    high: Value,
    #[serde(default)]
    low: Value,
    #[serde(default)]
    previous_close: Value,
    #[serde(default)]
    timestamp: Value,
}

impl RealtimePayload {
    /// Convert into a [`Quote`], filling gaps from the request context
    pub(crate) fn into_quote(self, requested_symbol: &str, received_at: DateTime<Utc>) -> Quote {
        let volume = numeric(&self.volume);
        let timestamp = numeric(&self.timestamp);
        let timestamp = if timestamp.is_finite() {
            Utc.timestamp_millis_opt(timestamp as i64)
                .single()
                .unwrap_or(received_at)
        } else {
            received_at
        };

        Quote {
            symbol: self
                .symbol
                .unwrap_or_else(|| requested_symbol.to_string()),
            price: numeric(&self.price),
            change: numeric(&self.change),
            change_percent: numeric(&self.change_percent),
            volume: if volume.is_finite() && volume > 0.0 {
                volume as u64
            } else {
                0
            },
            high: numeric(&self.high),
            low: numeric(&self.low),
            previous_close: numeric(&self.previous_close),
            timestamp,
        }
    }
}

fn numeric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Quote fetch errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// Body was not a realtime payload
    #[error("Invalid realtime payload: {0}")]
    Decode(String),
}
