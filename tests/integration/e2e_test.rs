//! End-to-end integration tests

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use stock_feed::chart::SvgChartRenderer;
use stock_feed::clock::{Clock, ManualClock};
use stock_feed::config::Config;
use stock_feed::feed::SyntheticQuoteSource;
use stock_feed::polling::{FeedSettings, FeedStatus, QuoteOrigin, SymbolFeed};

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    config.validate().unwrap();
    assert_eq!(config.polling.refresh_interval_secs, 30);
    assert_eq!(config.polling.symbols, vec!["GOOGL", "AMZN", "CRCL"]);
    assert!(config.feed.base_url.is_none());
}

#[tokio::test]
async fn test_simulated_session() {
    let config = Config::default();
    let settings = FeedSettings::from_config(&config);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
    ));
    let source = Arc::new(SyntheticQuoteSource::seeded(
        Arc::clone(&settings.generator),
        clock.clone(),
        42,
    ));
    let feed = SymbolFeed::new(
        "GOOGL",
        source,
        settings,
        clock.clone(),
        StdRng::seed_from_u64(42),
    );
    let renderer = SvgChartRenderer::new(&config.chart);

    assert!(feed.snapshot().await.is_loading());

    let mut newest = None;
    // five simulated minutes at the 30 s polling cadence
    for _ in 0..10 {
        feed.refresh().await;
        let snapshot = feed.snapshot().await;

        assert_eq!(snapshot.status, FeedStatus::Ready);
        assert_eq!(snapshot.origin, Some(QuoteOrigin::Remote));
        assert!(!snapshot.is_stale);
        assert!(snapshot.points.len() <= 50);
        assert!(snapshot
            .points
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));

        let price = snapshot.current_price.unwrap();
        assert!(price.is_finite());
        assert!((price - 175.42).abs() < 5.0);

        let last = snapshot.points.last().unwrap().timestamp;
        assert_eq!(last, clock.now());
        if let Some(previous) = newest {
            assert!(last >= previous);
        }
        newest = Some(last);

        let svg = renderer.render(&snapshot).unwrap();
        assert!(svg.contains("<polyline"));

        clock.advance(Duration::seconds(30));
    }

    // no refresh for longer than the freshness window
    assert!(feed.is_stale().await);
    clock.advance(Duration::seconds(30));
    let snapshot = feed.snapshot().await;
    assert!(snapshot.is_stale);
    assert_eq!(snapshot.points.len(), 50);
}
