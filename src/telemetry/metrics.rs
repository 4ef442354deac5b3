//! Prometheus metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op apart from the debug log line.

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Quotes returned by the source
    QuoteFetches,
    /// Fetch failures masked by a synthetic quote
    FallbackQuotes,
    /// Histories rebuilt from a new quote
    HistoryRegenerations,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Latest applied price
    QuotePrice,
    /// Symbols with at least one subscriber
    ActiveSymbols,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Round trip of a single quote fetch
    QuoteFetch,
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::QuoteFetches => "stockfeed_quote_fetches_total",
            CounterMetric::FallbackQuotes => "stockfeed_fallback_quotes_total",
            CounterMetric::HistoryRegenerations => "stockfeed_history_regenerations_total",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::QuotePrice => "stockfeed_quote_price",
            GaugeMetric::ActiveSymbols => "stockfeed_active_symbols",
        }
    }
}

impl LatencyMetric {
    pub fn name(self) -> &'static str {
        match self {
            LatencyMetric::QuoteFetch => "stockfeed_quote_fetch_latency_ms",
        }
    }
}

/// Increment a per-symbol counter
pub fn increment(metric: CounterMetric, symbol: &str) {
    ::metrics::counter!(metric.name(), "symbol" => symbol.to_string()).increment(1);
}

/// Set a gauge value, labelled by symbol when given
pub fn set_gauge(metric: GaugeMetric, symbol: Option<&str>, value: f64) {
    match symbol {
        Some(symbol) => ::metrics::gauge!(metric.name(), "symbol" => symbol.to_string()).set(value),
        None => ::metrics::gauge!(metric.name()).set(value),
    }
    tracing::trace!(metric = metric.name(), symbol, value, "Setting gauge");
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, symbol: &str, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    ::metrics::histogram!(metric.name(), "symbol" => symbol.to_string()).record(value_ms);
    tracing::debug!(metric = metric.name(), symbol, value_ms, "Recording latency");
}
