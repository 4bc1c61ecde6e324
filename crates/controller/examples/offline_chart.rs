//! Offline chart demonstration
//!
//! Runs a chart session against generated candles. Pass a config file
//! (YAML, JSON or TOML) as the first argument to override the defaults.

use candle_charts_config::{ChartConfig, ConfigParser, IndicatorSettings};
use candle_charts_controller::{
    ChartController, ChartSession, RenderSink, RenderSnapshot, SystemClock, ViewportChange,
};
use candle_charts_data::{CachedFetcher, MemoryFetcher};
use candle_charts_shared::{Candle, DisplayRange, Interval, TimeRange, SECONDS_PER_DAY};
use std::sync::Arc;

struct PrintSink;

impl RenderSink for PrintSink {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        let overlays = &snapshot.indicator_overlays;
        println!(
            "{} @ {}: {} candles, limit reached: {}, ma20: {}, trendline: {:?}",
            snapshot.symbol,
            snapshot.active_interval,
            snapshot.candles.len(),
            snapshot.reached_historical_limit,
            overlays.ma20.is_some(),
            overlays.trendline.map(|line| line.kind),
        );
        if let Some(change) = snapshot.visible_change {
            println!("  visible change: {change:.2}%");
        }
    }

    fn restore_visible_range(&mut self, range: TimeRange) {
        println!("  restore visible range: {} .. {}", range.start, range.end);
    }
}

fn generated_history(now: i64, days: i64) -> Vec<Candle> {
    let today = now - now.rem_euclid(SECONDS_PER_DAY);
    (0..days)
        .map(|i| {
            let time = today - (days - i) * SECONDS_PER_DAY;
            let base = 100.0 + i as f64 * 0.05 + (i as f64 / 9.0).sin() * 4.0;
            Candle::new(time, base, base + 1.5, base - 1.5, base + 0.4, 10_000 + i as u64)
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ConfigParser::load(path)?,
        None => ChartConfig {
            indicators: IndicatorSettings::all(),
            ..ChartConfig::default()
        },
    };

    let clock = Arc::new(SystemClock);
    let now = chrono::Utc::now().timestamp();
    let provider = MemoryFetcher::new();
    provider.insert("DEMO", Interval::Day1, generated_history(now, 3 * 365));
    let fetcher = CachedFetcher::new(provider, config.cache.capacity, config.cache.ttl());

    let controller = ChartController::new(config, clock);
    let mut session = ChartSession::new(controller, Arc::new(fetcher), PrintSink);

    println!("Opening six months of DEMO");
    session.open("DEMO", DisplayRange::SixMonths);
    session.run_until_idle().await;

    println!("Panning to the left edge");
    session.viewport_changed(ViewportChange::user(0.0, 60.0));
    session.run_until_idle().await;

    println!("Switching to weekly candles");
    session.request_interval(Interval::Week1);
    session.run_until_idle().await;

    Ok(())
}
