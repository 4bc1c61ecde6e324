//! End-to-end runs of a chart session against an in-memory provider

use candle_charts_config::ChartConfig;
use candle_charts_controller::{
    ChartController, ChartRegistry, ChartSession, ChartState, ImmediateScheduler, ManualClock,
    RenderSink, RenderSnapshot, ViewportChange,
};
use candle_charts_data::{bucket_start, CachedFetcher, MemoryFetcher};
use candle_charts_shared::{Candle, ChartsError, DisplayRange, Interval, TimeRange};
use std::sync::Arc;
use std::time::Duration;

const DAY: i64 = 86_400;
const HOUR: i64 = 3_600;
const NOW_DAY: i64 = 20_000;
const NOW: i64 = NOW_DAY * DAY;

#[derive(Default)]
struct RecordingSink {
    renders: Vec<RenderSnapshot>,
    restores: Vec<TimeRange>,
}

impl RenderSink for RecordingSink {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        self.renders.push(snapshot.clone());
    }

    fn restore_visible_range(&mut self, range: TimeRange) {
        self.restores.push(range);
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn candle(time: i64) -> Candle {
    let price = 50.0 + ((time / HOUR) % 17) as f64;
    Candle::new(time, price, price + 2.0, price - 2.0, price + 1.0, 100)
}

/// Provider with daily history from `first_day` and thirty days of hourly data
fn provider(first_day: i64) -> MemoryFetcher {
    let fetcher = MemoryFetcher::new().with_now(NOW);
    fetcher.insert(
        "AAPL",
        Interval::Day1,
        (first_day..NOW_DAY).map(|d| candle(d * DAY)).collect(),
    );
    fetcher.insert(
        "AAPL",
        Interval::Hour1,
        (0..30 * 24).map(|h| candle(NOW - 30 * DAY + h * HOUR)).collect(),
    );
    fetcher
}

fn controller() -> ChartController {
    init_logging();
    ChartController::new(ChartConfig::default(), Arc::new(ManualClock::new(NOW)))
}

#[tokio::test(start_paused = true)]
async fn test_session_loads_and_backfills_to_limit() {
    let mut session = ChartSession::new(controller(), Arc::new(provider(19_000)), RecordingSink::default());

    session.open("AAPL", DisplayRange::SixMonths);
    session.run_until_idle().await;

    let controller = session.controller();
    assert_eq!(controller.state(), ChartState::Loaded);
    assert_eq!(session.sink().renders.len(), 1);
    let initial_oldest = controller.window().unwrap().oldest_time().unwrap();

    session.viewport_changed(ViewportChange::user(1.0, 60.0));
    session.run_until_idle().await;
    let after_one = session.controller().window().unwrap().oldest_time().unwrap();
    assert!(after_one < initial_oldest);

    for _ in 0..10 {
        session.viewport_changed(ViewportChange::user(0.0, 60.0));
        session.run_until_idle().await;
    }

    let window = session.controller().window().unwrap();
    assert!(window.reached_historical_limit);
    assert_eq!(window.oldest_time(), Some(19_000 * DAY));
    assert_eq!(window.len(), 1_000);
    assert!(session.sink().renders.last().unwrap().reached_historical_limit);
    assert_eq!(session.pending(), 0);
}

#[tokio::test]
async fn test_session_switches_to_derived_four_hour() {
    let mut session = ChartSession::with_scheduler(
        controller(),
        Arc::new(provider(19_000)),
        Arc::new(ImmediateScheduler),
        RecordingSink::default(),
    );

    session.open("AAPL", DisplayRange::OneMonth);
    session.run_until_idle().await;
    let intended = session.controller().window().unwrap().intended;

    session.request_interval(Interval::Hour4);
    session.run_until_idle().await;

    let window = session.controller().window().unwrap();
    assert_eq!(window.interval, Interval::Hour4);
    assert_eq!(window.len(), 30 * 6);
    assert!(window
        .candles()
        .iter()
        .all(|c| bucket_start(c.time, 4 * HOUR) == c.time));
    // each four-hour candle sums four hourly volumes
    assert!(window.candles().iter().all(|c| c.volume == 400));
    assert_eq!(session.sink().restores, vec![intended]);
    assert_eq!(session.sink().renders.last().unwrap().active_interval, Interval::Hour4);
}

#[tokio::test]
async fn test_four_hour_backfill_keeps_whole_buckets() {
    let fetcher = MemoryFetcher::new().with_now(NOW);
    fetcher.insert(
        "AAPL",
        Interval::Hour1,
        (0..55 * 24).map(|h| candle(NOW - 55 * DAY + h * HOUR)).collect(),
    );
    let mut session = ChartSession::with_scheduler(
        controller(),
        Arc::new(fetcher),
        Arc::new(ImmediateScheduler),
        RecordingSink::default(),
    );

    session.open("AAPL", DisplayRange::OneMonth);
    session.run_until_idle().await;
    // custom range starting mid-hour; the zoom-in to 5m finds no data
    session.viewport_changed(ViewportChange::user(10.3, 29.0));
    session.run_until_idle().await;
    assert_eq!(session.controller().active_interval(), Some(Interval::Hour1));

    session.request_interval(Interval::Hour4);
    session.run_until_idle().await;
    let switched = session.controller().window().unwrap().len();
    assert_eq!(session.controller().active_interval(), Some(Interval::Hour4));

    session.viewport_changed(ViewportChange::user(0.0, 150.0));
    session.run_until_idle().await;

    let window = session.controller().window().unwrap();
    assert_eq!(window.interval, Interval::Hour4);
    assert!(window.len() > switched);
    assert!(candle_charts_shared::candle::is_strictly_ascending(window.candles()));
    for c in window.candles() {
        assert_eq!(bucket_start(c.time, 4 * HOUR), c.time);
        assert!(c.is_consistent());
        assert_eq!(c.volume, 400, "partial bucket at {}", c.time);
    }
}

#[tokio::test]
async fn test_session_close_abandons_pending_work() {
    let mut session = ChartSession::with_scheduler(
        controller(),
        Arc::new(provider(19_000)),
        Arc::new(ImmediateScheduler),
        RecordingSink::default(),
    );

    session.open("AAPL", DisplayRange::SixMonths);
    assert_eq!(session.pending(), 1);
    session.close();
    assert_eq!(session.pending(), 0);

    session.run_until_idle().await;
    assert!(session.sink().renders.is_empty());
    assert!(session.controller().window().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_session_through_response_cache() {
    let cached = Arc::new(CachedFetcher::new(provider(19_000), 16, Duration::from_secs(300)));
    let mut session = ChartSession::new(controller(), cached.clone(), RecordingSink::default());

    session.open("AAPL", DisplayRange::OneYear);
    session.run_until_idle().await;
    session.select_range(DisplayRange::OneYear);
    session.run_until_idle().await;

    let stats = cached.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(session.sink().renders.len(), 2);
}

#[test]
fn test_registry_keeps_charts_apart() {
    init_logging();
    let mut registry = ChartRegistry::new(ChartConfig::default(), Arc::new(ManualClock::new(NOW)));

    let (aapl, effects) = registry.open_chart("AAPL", DisplayRange::OneYear);
    assert_eq!(effects.len(), 1);
    let (msft, _) = registry.open_chart("MSFT", DisplayRange::FiveDays);
    assert_ne!(aapl, msft);
    assert_eq!(registry.len(), 2);

    let symbol = registry.with_chart(msft, |chart| chart.symbol().map(str::to_string));
    assert_eq!(symbol, Ok(Some("MSFT".to_string())));
    let interval = registry.with_chart(msft, |chart| chart.active_interval()).unwrap();
    assert_eq!(interval, Some(Interval::Min15));

    registry.with_chart_mut(aapl, |chart| chart.close()).unwrap();
    assert_eq!(registry.with_chart(aapl, |chart| chart.symbol().is_none()), Ok(true));

    registry.close_chart(aapl).unwrap();
    assert!(!registry.contains(aapl));
    assert!(matches!(
        registry.with_chart(aapl, |_| ()),
        Err(ChartsError::ChartNotFound { .. })
    ));
    assert!(registry.close_chart(aapl).is_err());
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![msft]);
}
