//! Watch command implementation

use crate::chart::{format_percent, format_price, ChartSnapshot};
use crate::config::Config;
use crate::polling::FeedSubscription;
use clap::Args;
use std::time::Duration;
use tokio::task::JoinSet;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Symbols to watch (defaults to the configured list)
    pub symbols: Vec<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Use the local generator even if a base URL is configured
    #[arg(long)]
    pub simulated: bool,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbols = if self.symbols.is_empty() {
            config.polling.symbols.clone()
        } else {
            self.symbols.clone()
        };
        if symbols.is_empty() {
            anyhow::bail!("No symbols to watch");
        }

        let coordinator = super::coordinator(config, self.simulated)?;
        let mut watchers = JoinSet::new();
        for symbol in &symbols {
            watchers.spawn(watch_symbol(coordinator.subscribe(symbol)));
        }
        tracing::info!(symbols = ?coordinator.active_symbols(), "Watching");

        match self.duration_secs {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                tokio::signal::ctrl_c().await?;
            }
        }

        tracing::info!("Shutting down");
        watchers.shutdown().await;
        Ok(())
    }
}

/// Log every snapshot of one subscription until it is cancelled
async fn watch_symbol(mut subscription: FeedSubscription) {
    loop {
        subscription.changed().await;
        log_snapshot(&subscription.snapshot().await);
    }
}

fn log_snapshot(snapshot: &ChartSnapshot) {
    tracing::info!(
        symbol = %snapshot.symbol,
        price = %format_price(snapshot.current_price.unwrap_or(f64::NAN)),
        change = %format_percent(snapshot.change_percent.unwrap_or(f64::NAN)),
        points = snapshot.points.len(),
        stale = snapshot.is_stale,
        origin = ?snapshot.origin,
        "Snapshot"
    );
}
