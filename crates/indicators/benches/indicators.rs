//! Benchmarks for the indicator engine

use candle_charts_indicators::{
    bollinger_bands, compute_all, ema_array, find_downtrend_line, find_uptrend_line, sma_array,
};
use candle_charts_shared::Candle;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Daily candles following a noisy sine wave around 100
fn create_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + (t * 0.1).sin() * 10.0 + (t * 0.73).cos() * 2.0;
            let open = close - (t * 0.3).sin();
            Candle::new(
                i as i64 * 86_400,
                open,
                open.max(close) * 1.01,
                open.min(close) * 0.99,
                close,
                1_000 + i as u64,
            )
        })
        .collect()
}

fn bench_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_averages");

    for size in [250, 1_000, 5_000] {
        let candles = create_candles(size);
        group.bench_with_input(BenchmarkId::new("sma_array_20", size), &candles, |b, candles| {
            b.iter(|| sma_array(black_box(candles), 20));
        });
        group.bench_with_input(BenchmarkId::new("ema_array_20", size), &candles, |b, candles| {
            b.iter(|| ema_array(black_box(candles), 20));
        });
        group.bench_with_input(BenchmarkId::new("bollinger_20", size), &candles, |b, candles| {
            b.iter(|| bollinger_bands(black_box(candles), 20, 2.0));
        });
    }

    group.finish();
}

fn bench_trend_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("trend_lines");
    group.sample_size(20);

    for size in [100, 500, 2_000] {
        let candles = create_candles(size);
        group.bench_with_input(BenchmarkId::new("uptrend", size), &candles, |b, candles| {
            b.iter(|| find_uptrend_line(black_box(candles)));
        });
        group.bench_with_input(BenchmarkId::new("downtrend", size), &candles, |b, candles| {
            b.iter(|| find_downtrend_line(black_box(candles)));
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let candles = create_candles(1_000);
    c.bench_function("compute_all_1000", |b| {
        b.iter(|| compute_all(black_box(&candles)));
    });
}

criterion_group!(benches, bench_moving_averages, bench_trend_lines, bench_snapshot);
criterion_main!(benches);
