//! stock-feed: simulated real-time market data for tokenized stocks
//!
//! This library provides the core components for:
//! - Synthetic quotes from a deterministic-plus-noise price generator
//! - Quote sources over HTTP or the local generator
//! - Per-symbol polling with fallback quotes and staleness tracking
//! - History synthesis and chart indicators (SMA, OHLC, oscillator)
//! - Chart snapshots and SVG rendering
//! - Structured logging and Prometheus metrics

pub mod chart;
pub mod cli;
pub mod clock;
pub mod config;
pub mod feed;
pub mod model;
pub mod polling;
pub mod telemetry;
