use clap::Parser;
use stock_feed::cli::{Cli, Commands};
use stock_feed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; only an unreadable file falls back to defaults
    let (config, load_error) = Config::load_or_default(&cli.config)
        .map_err(|e| e.context(format!("Invalid config {}", cli.config)))?;

    // Initialize telemetry
    let _telemetry = stock_feed::telemetry::init_telemetry(&config.telemetry)?;

    if let Some(e) = load_error {
        tracing::warn!(path = %cli.config, error = %e, "Could not load config, using defaults");
    }

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!("Starting watch");
            args.execute(&config).await?;
        }
        Commands::Chart(args) => {
            tracing::info!(symbol = %args.symbol, "Rendering chart");
            args.execute(&config).await?;
        }
        Commands::Quote(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            match &config.feed.base_url {
                Some(url) => println!("  Feed: {} (timeout {}s)", url, config.feed.timeout_secs),
                None => println!("  Feed: simulated"),
            }
            println!(
                "  Polling: every {}s, stale after {}s, symbols {:?}",
                config.polling.refresh_interval_secs,
                config.polling.stale_after_secs,
                config.polling.symbols
            );
            println!(
                "  Generator: default base {}, volume {}..={}",
                config.generator.default_base_price,
                config.generator.volume_min,
                config.generator.volume_max
            );
            println!(
                "  History: {} points every {}s, deviation {}",
                config.history.length, config.history.spacing_secs, config.history.max_deviation
            );
            println!(
                "  Chart: SMA {}, {}x{}",
                config.chart.sma_window, config.chart.width, config.chart.height
            );
            println!(
                "  Telemetry: level {}, format {:?}, metrics {:?}",
                config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
