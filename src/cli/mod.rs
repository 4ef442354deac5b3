//! CLI interface for stock-feed
//!
//! Provides subcommands for:
//! - `watch`: Poll symbols and log each refreshed snapshot
//! - `chart`: Write an SVG chart for one symbol
//! - `quote`: Print one synthetic realtime payload
//! - `config`: Show configuration

mod chart;
mod quote;
mod watch;

pub use chart::ChartArgs;
pub use quote::QuoteArgs;
pub use watch::WatchArgs;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::feed::{QuoteSource, RestQuoteClient, SyntheticQuoteSource};
use crate::polling::{FeedSettings, PollingCoordinator};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "stock-feed")]
#[command(about = "Simulated real-time market data and chart feeds for tokenized stocks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll symbols and log every refreshed snapshot
    Watch(WatchArgs),
    /// Write an SVG chart for a symbol
    Chart(ChartArgs),
    /// Print one synthetic realtime payload as JSON
    Quote(QuoteArgs),
    /// Show configuration
    Config,
}

/// Build the quote source for this run
///
/// The REST client is used when a base URL is configured, unless
/// `simulated` forces the local generator.
pub(crate) fn quote_source(
    config: &Config,
    settings: &FeedSettings,
    simulated: bool,
) -> anyhow::Result<Arc<dyn QuoteSource>> {
    if !simulated {
        if let Some(client) = RestQuoteClient::from_config(&config.feed)? {
            tracing::info!(base_url = %client.base_url(), "Using remote quote source");
            let source: Arc<dyn QuoteSource> = Arc::new(client);
            return Ok(source);
        }
    }

    tracing::info!("Using simulated quote source");
    let clock = Arc::new(SystemClock);
    let generator = Arc::clone(&settings.generator);
    let source: Arc<dyn QuoteSource> = match config.polling.seed {
        Some(seed) => Arc::new(SyntheticQuoteSource::seeded(generator, clock, seed)),
        None => Arc::new(SyntheticQuoteSource::new(generator, clock)),
    };
    Ok(source)
}

/// Coordinator wired to the configured source and seed
pub(crate) fn coordinator(config: &Config, simulated: bool) -> anyhow::Result<Arc<PollingCoordinator>> {
    let settings = FeedSettings::from_config(config);
    let source = quote_source(config, &settings, simulated)?;
    Ok(Arc::new(
        PollingCoordinator::new(settings, source).with_seed(config.polling.seed),
    ))
}
