//! Benchmarks for chart point derivation

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stock_feed::feed::Quote;
use stock_feed::model::{simple_moving_average, HistorySynthesizer, IndicatorCalculator};

fn quote() -> Quote {
    Quote {
        symbol: "GOOGL".to_string(),
        price: 175.42,
        change: 0.81,
        change_percent: 0.46,
        volume: 17_000_000,
        high: 176.3,
        low: 174.9,
        previous_close: 174.61,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
    }
}

fn benchmark_history_synthesis(c: &mut Criterion) {
    let synthesizer = HistorySynthesizer::default();
    let quote = quote();
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("history_synthesis", |b| {
        b.iter(|| synthesizer.synthesize(black_box(&quote), quote.timestamp, &mut rng))
    });
}

fn benchmark_annotate(c: &mut Criterion) {
    let quote = quote();
    let mut rng = StdRng::seed_from_u64(2);
    let history = HistorySynthesizer::default().synthesize(&quote, quote.timestamp, &mut rng);
    let calculator = IndicatorCalculator::default();

    c.bench_function("annotate_50", |b| {
        b.iter(|| calculator.annotate(black_box(&history), &mut rng))
    });
}

fn benchmark_sma(c: &mut Criterion) {
    let quote = quote();
    let mut rng = StdRng::seed_from_u64(3);
    let prices: Vec<_> = HistorySynthesizer::default()
        .synthesize(&quote, quote.timestamp, &mut rng)
        .into_iter()
        .map(|p| p.price)
        .collect();

    c.bench_function("sma_10", |b| {
        b.iter(|| simple_moving_average(black_box(&prices), 10))
    });
}

criterion_group!(
    benches,
    benchmark_history_synthesis,
    benchmark_annotate,
    benchmark_sma
);
criterion_main!(benches);
