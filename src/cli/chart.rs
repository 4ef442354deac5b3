//! Chart command implementation

use crate::chart::{format_change, format_percent, format_price, SvgChartRenderer};
use crate::config::Config;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ChartArgs {
    /// Symbol to chart
    pub symbol: String,

    /// Output SVG path
    #[arg(short, long, default_value = "chart.svg")]
    pub output: PathBuf,

    /// Use the local generator even if a base URL is configured
    #[arg(long)]
    pub simulated: bool,

    /// Give up waiting for the first quote after this many seconds
    #[arg(long, default_value = "15")]
    pub timeout_secs: u64,
}

impl ChartArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let coordinator = super::coordinator(config, self.simulated)?;
        let mut subscription = coordinator.subscribe(&self.symbol);

        tokio::time::timeout(Duration::from_secs(self.timeout_secs), subscription.changed())
            .await
            .map_err(|_| anyhow::anyhow!("No quote for {} within {}s", self.symbol, self.timeout_secs))?;

        let snapshot = subscription.snapshot().await;
        SvgChartRenderer::new(&config.chart).render_to_file(&snapshot, &self.output)?;

        println!(
            "{} {} {} ({}) -> {}",
            snapshot.symbol,
            format_price(snapshot.current_price.unwrap_or(f64::NAN)),
            format_change(snapshot.change.unwrap_or(f64::NAN)),
            format_percent(snapshot.change_percent.unwrap_or(f64::NAN)),
            self.output.display()
        );
        Ok(())
    }
}
