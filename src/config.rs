//! Configuration types for stock-feed

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Remote quote source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the realtime endpoint; `None` runs in simulated-data mode
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Polling coordinator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Interval between fetch attempts (seconds)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Age after which a cached quote is presented as stale (seconds)
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,

    /// Symbols watched when none are given on the command line
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_refresh_interval_secs() -> u64 {
    30
}
fn default_stale_after_secs() -> u64 {
    25
}
fn default_symbols() -> Vec<String> {
    vec!["GOOGL".to_string(), "AMZN".to_string(), "CRCL".to_string()]
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            stale_after_secs: default_stale_after_secs(),
            symbols: default_symbols(),
            seed: None,
        }
    }
}

/// Synthetic price generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Base price for symbols missing from `base_prices`
    #[serde(default = "default_base_price")]
    pub default_base_price: f64,

    /// Per-symbol base prices
    #[serde(default = "default_base_prices")]
    pub base_prices: HashMap<String, f64>,

    /// Amplitude of the slow (daily) oscillation
    #[serde(default = "default_slow_amplitude")]
    pub slow_amplitude: f64,

    /// Divisor applied to elapsed seconds for the slow oscillation
    #[serde(default = "default_slow_period_secs")]
    pub slow_period_secs: f64,

    /// Amplitude of the fast (minute) oscillation
    #[serde(default = "default_fast_amplitude")]
    pub fast_amplitude: f64,

    /// Divisor applied to elapsed seconds for the fast oscillation
    #[serde(default = "default_fast_period_secs")]
    pub fast_period_secs: f64,

    /// Full width of the uniform noise band
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,

    /// Fraction of |change| added above/below price for high/low
    #[serde(default = "default_high_low_spread")]
    pub high_low_spread: f64,

    /// Inclusive volume band
    #[serde(default = "default_quote_volume_min")]
    pub volume_min: u64,
    #[serde(default = "default_quote_volume_max")]
    pub volume_max: u64,
}

fn default_base_price() -> f64 {
    28.45
}
fn default_base_prices() -> HashMap<String, f64> {
    HashMap::from([("GOOGL".to_string(), 175.42), ("AMZN".to_string(), 185.21)])
}
fn default_slow_amplitude() -> f64 {
    3.0
}
fn default_slow_period_secs() -> f64 {
    3600.0
}
fn default_fast_amplitude() -> f64 {
    1.5
}
fn default_fast_period_secs() -> f64 {
    60.0
}
fn default_noise_amplitude() -> f64 {
    0.8
}
fn default_high_low_spread() -> f64 {
    0.5
}
fn default_quote_volume_min() -> u64 {
    15_000_000
}
fn default_quote_volume_max() -> u64 {
    20_000_000
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_base_price: default_base_price(),
            base_prices: default_base_prices(),
            slow_amplitude: default_slow_amplitude(),
            slow_period_secs: default_slow_period_secs(),
            fast_amplitude: default_fast_amplitude(),
            fast_period_secs: default_fast_period_secs(),
            noise_amplitude: default_noise_amplitude(),
            high_low_spread: default_high_low_spread(),
            volume_min: default_quote_volume_min(),
            volume_max: default_quote_volume_max(),
        }
    }
}

/// History synthesis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Number of points per synthesized history
    #[serde(default = "default_history_length")]
    pub length: usize,

    /// Spacing between consecutive points (seconds)
    #[serde(default = "default_spacing_secs")]
    pub spacing_secs: u64,

    /// Maximum relative deviation from the current price (0.01 = ±1%)
    #[serde(default = "default_max_deviation")]
    pub max_deviation: f64,

    /// Inclusive per-point volume band
    #[serde(default = "default_point_volume_min")]
    pub volume_min: u64,
    #[serde(default = "default_point_volume_max")]
    pub volume_max: u64,
}

fn default_history_length() -> usize {
    50
}
fn default_spacing_secs() -> u64 {
    60
}
fn default_max_deviation() -> f64 {
    0.01
}
fn default_point_volume_min() -> u64 {
    50_000
}
fn default_point_volume_max() -> u64 {
    150_000
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            length: default_history_length(),
            spacing_secs: default_spacing_secs(),
            max_deviation: default_max_deviation(),
            volume_min: default_point_volume_min(),
            volume_max: default_point_volume_max(),
        }
    }
}

/// Chart preparation and rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    /// Trailing window of the simple moving average
    #[serde(default = "default_sma_window")]
    pub sma_window: usize,

    /// Full width of the per-point OHLC variation band
    #[serde(default = "default_variation")]
    pub variation: f64,

    /// Margin added below/above the price axis data range
    #[serde(default = "default_axis_padding")]
    pub axis_padding: Decimal,

    /// Rendered image size in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_sma_window() -> usize {
    10
}
fn default_variation() -> f64 {
    0.4
}
fn default_axis_padding() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_width() -> u32 {
    960
}
fn default_height() -> u32 {
    540
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            sma_window: default_sma_window(),
            variation: default_variation(),
            axis_padding: default_axis_padding(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a TOML file, or defaults when the file cannot be read
    ///
    /// The read error is handed back with the defaults so the caller can
    /// report it once logging is up. A file that reads but does not parse
    /// or validate is still an error.
    pub fn load_or_default(
        path: impl AsRef<std::path::Path>,
    ) -> anyhow::Result<(Self, Option<std::io::Error>)> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok((Self::from_toml(&content)?, None)),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }

    /// Parse and validate TOML configuration text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.polling.refresh_interval_secs == 0 {
            anyhow::bail!("polling.refresh_interval_secs must be positive");
        }
        if self.history.length == 0 {
            anyhow::bail!("history.length must be positive");
        }
        if self.chart.sma_window == 0 {
            anyhow::bail!("chart.sma_window must be positive");
        }
        if self.generator.volume_min > self.generator.volume_max {
            anyhow::bail!(
                "generator volume band is inverted: {} > {}",
                self.generator.volume_min,
                self.generator.volume_max
            );
        }
        if self.history.volume_min > self.history.volume_max {
            anyhow::bail!(
                "history volume band is inverted: {} > {}",
                self.history.volume_min,
                self.history.volume_max
            );
        }
        Ok(())
    }
}
