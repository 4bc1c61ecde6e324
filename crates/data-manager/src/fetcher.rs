//! Market-data fetch contract
//!
//! The network transport lives outside this workspace. Anything that can
//! produce candles for a symbol and window implements [`CandleFetcher`].

use crate::aggregation::aggregate_to_interval;
use crate::normalize;
use candle_charts_shared::{Candle, DisplayRange, FetchError, Interval, TimeRange};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Explicit window request `[period1, period2]` at one interval
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    pub symbol: String,
    pub period1: i64,
    pub period2: i64,
    pub interval: Interval,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, period1: i64, period2: i64, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            period1,
            period2,
            interval,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.period1, self.period2)
    }
}

/// Source of candle data
pub trait CandleFetcher: Send + Sync {
    /// Candles for `[period1, period2]` at exactly `interval`.
    ///
    /// Implementations only need to support intervals the provider serves;
    /// use [`fetch_window`] to get derived intervals.
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        period1: i64,
        period2: i64,
        interval: Interval,
    ) -> BoxFuture<'a, FetchResult<Vec<Candle>>>;

    /// Candles for a predefined range at that range's interval
    fn fetch_candles_by_range<'a>(
        &'a self,
        symbol: &'a str,
        range: DisplayRange,
    ) -> BoxFuture<'a, FetchResult<Vec<Candle>>>;
}

/// Fetches a window at the request's interval, requesting hourly data and
/// aggregating when the interval is derived. The result is sorted and free
/// of duplicate timestamps.
pub async fn fetch_window(
    fetcher: &dyn CandleFetcher,
    request: &FetchRequest,
) -> FetchResult<Vec<Candle>> {
    let source_interval = request.interval.fetch_interval();
    let candles = fetcher
        .fetch_candles(&request.symbol, request.period1, request.period2, source_interval)
        .await?;
    let candles = aggregate_to_interval(normalize(candles), request.interval);
    log::debug!(
        "fetched {} {} candles for {} [{}, {}]",
        candles.len(),
        request.interval,
        request.symbol,
        request.period1,
        request.period2
    );
    Ok(candles)
}

/// In-memory fetcher serving stored series.
///
/// Useful for offline charts and tests. Windows with no stored candles fail
/// with [`FetchError::NoData`].
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    series: RwLock<HashMap<(String, Interval), Vec<Candle>>>,
    now: Option<i64>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins "now" for range lookups instead of reading the system clock
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    pub fn insert(&self, symbol: impl Into<String>, interval: Interval, candles: Vec<Candle>) {
        self.series
            .write()
            .insert((symbol.into(), interval), normalize(candles));
    }

    fn now(&self) -> i64 {
        self.now.unwrap_or_else(|| chrono::Utc::now().timestamp())
    }

    fn window(&self, symbol: &str, period1: i64, period2: i64, interval: Interval) -> FetchResult<Vec<Candle>> {
        let series = self.series.read();
        let candles: Vec<Candle> = series
            .get(&(symbol.to_string(), interval))
            .map(|all| {
                all.iter()
                    .filter(|c| c.time >= period1 && c.time <= period2)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        if candles.is_empty() {
            Err(FetchError::no_data(symbol))
        } else {
            Ok(candles)
        }
    }
}

impl CandleFetcher for MemoryFetcher {
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        period1: i64,
        period2: i64,
        interval: Interval,
    ) -> BoxFuture<'a, FetchResult<Vec<Candle>>> {
        Box::pin(async move { self.window(symbol, period1, period2, interval) })
    }

    fn fetch_candles_by_range<'a>(
        &'a self,
        symbol: &'a str,
        range: DisplayRange,
    ) -> BoxFuture<'a, FetchResult<Vec<Candle>>> {
        Box::pin(async move {
            let (start, end) = range.window(self.now());
            self.window(symbol, start, end, range.interval())
        })
    }
}
