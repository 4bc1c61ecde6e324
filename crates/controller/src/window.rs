//! The loaded candle window of one open chart

use candle_charts_shared::{Candle, Interval, TimeRange};
use serde::Serialize;
use std::collections::HashSet;

/// Candles currently loaded for a chart plus the range the user asked for.
///
/// `candles` is always ascending with unique timestamps. The intended range
/// is what the user conceptually requested and can be narrower or wider
/// than what is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartWindow {
    pub symbol: String,
    pub interval: Interval,
    candles: Vec<Candle>,
    pub reached_historical_limit: bool,
    pub intended: TimeRange,
}

impl ChartWindow {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        candles: Vec<Candle>,
        intended: TimeRange,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            candles: well_formed(candles),
            reached_historical_limit: false,
            intended,
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn oldest_time(&self) -> Option<i64> {
        self.candles.first().map(|c| c.time)
    }

    pub fn newest_time(&self) -> Option<i64> {
        self.candles.last().map(|c| c.time)
    }

    /// Loaded span from oldest to newest candle
    pub fn loaded_range(&self) -> Option<TimeRange> {
        Some(TimeRange::new(self.oldest_time()?, self.newest_time()?))
    }

    /// Merges older candles into the window.
    ///
    /// Timestamps already present are dropped, as are candles whose prices
    /// break the OHLC ordering, and the result is re-sorted.
    /// Returns how many candles were added.
    pub fn merge_history(&mut self, incoming: Vec<Candle>) -> usize {
        let existing: HashSet<i64> = self.candles.iter().map(|c| c.time).collect();
        let fresh = well_formed(
            incoming
                .into_iter()
                .filter(|c| !existing.contains(&c.time))
                .collect(),
        );
        let added = fresh.len();
        if added > 0 {
            self.candles.extend(fresh);
            self.candles.sort_by_key(|c| c.time);
        }
        added
    }

    /// Number of candles strictly older than `time`
    pub fn count_before(&self, time: i64) -> usize {
        self.candles.partition_point(|c| c.time < time)
    }

    /// Time at a fractional logical index.
    ///
    /// Indices outside the loaded candles are extrapolated by the interval
    /// duration, as the render layer shows empty space there.
    pub fn time_at_logical(&self, index: f64) -> Option<i64> {
        let first = self.candles.first()?;
        let last = self.candles.last()?;
        let step = self.interval.seconds() as f64;
        let last_index = (self.candles.len() - 1) as f64;

        let time = if index <= 0.0 {
            first.time as f64 + index * step
        } else if index >= last_index {
            last.time as f64 + (index - last_index) * step
        } else {
            let lower = index.floor() as usize;
            let upper = index.ceil() as usize;
            let fraction = index - lower as f64;
            let t0 = self.candles[lower].time as f64;
            let t1 = self.candles[upper].time as f64;
            t0 + (t1 - t0) * fraction
        };
        Some(time.round() as i64)
    }

    /// Time range covered by a logical index range
    pub fn visible_time_range(&self, logical_from: f64, logical_to: f64) -> Option<TimeRange> {
        let (from, to) = if logical_from <= logical_to {
            (logical_from, logical_to)
        } else {
            (logical_to, logical_from)
        };
        Some(TimeRange::new(self.time_at_logical(from)?, self.time_at_logical(to)?))
    }

    /// Loaded candles inside a logical index range, clamped to the data
    pub fn visible_candles(&self, logical_from: f64, logical_to: f64) -> &[Candle] {
        if self.candles.is_empty() {
            return &[];
        }
        let last = self.candles.len() - 1;
        let from = logical_from.floor().max(0.0) as usize;
        let to = (logical_to.ceil().max(0.0) as usize).min(last);
        if from > to {
            return &[];
        }
        &self.candles[from..=to]
    }
}

/// Sorted, deduplicated candles with malformed bars removed
fn well_formed(candles: Vec<Candle>) -> Vec<Candle> {
    let total = candles.len();
    let kept = candle_charts_data::normalize(
        candles.into_iter().filter(Candle::is_consistent).collect(),
    );
    if kept.len() < total {
        log::debug!("Dropped {} malformed or duplicate candles", total - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn daily(start_day: i64, count: i64) -> Vec<Candle> {
        (start_day..start_day + count)
            .map(|d| Candle::flat(d * DAY, 100.0 + d as f64, 1))
            .collect()
    }

    fn window() -> ChartWindow {
        ChartWindow::new("AAPL", Interval::Day1, daily(10, 5), TimeRange::new(10 * DAY, 14 * DAY))
    }

    #[test]
    fn test_bounds() {
        let window = window();
        assert_eq!(window.oldest_time(), Some(10 * DAY));
        assert_eq!(window.newest_time(), Some(14 * DAY));
        assert!(!window.reached_historical_limit);
    }

    #[test]
    fn test_merge_history_drops_duplicates() {
        let mut window = window();
        let added = window.merge_history(daily(7, 5));

        assert_eq!(added, 3);
        assert_eq!(window.len(), 8);
        assert_eq!(window.oldest_time(), Some(7 * DAY));
        assert!(candle_charts_shared::candle::is_strictly_ascending(window.candles()));
        assert_eq!(window.count_before(10 * DAY), 3);

        assert_eq!(window.merge_history(daily(10, 2)), 0);
    }

    #[test]
    fn test_merge_history_drops_malformed_bars() {
        let mut window = window();
        let mut older = daily(7, 3);
        // high below the close
        older[1].high = older[1].close - 1.0;
        older[2].low = f64::NAN;

        assert_eq!(window.merge_history(older), 1);
        assert_eq!(window.oldest_time(), Some(7 * DAY));
        assert_eq!(window.count_before(10 * DAY), 1);
        assert!(window.candles().iter().all(Candle::is_consistent));
    }

    #[test]
    fn test_logical_time_mapping() {
        let window = window();
        assert_eq!(window.time_at_logical(0.0), Some(10 * DAY));
        assert_eq!(window.time_at_logical(2.5), Some(12 * DAY + DAY / 2));
        assert_eq!(window.time_at_logical(-3.0), Some(7 * DAY));
        assert_eq!(window.time_at_logical(6.0), Some(16 * DAY));

        let range = window.visible_time_range(4.0, 1.0).unwrap();
        assert_eq!(range, TimeRange::new(11 * DAY, 14 * DAY));
    }

    #[test]
    fn test_visible_candles_are_clamped() {
        let window = window();
        assert_eq!(window.visible_candles(-2.0, 1.2).len(), 3);
        assert_eq!(window.visible_candles(3.0, 40.0).len(), 2);
        assert!(window.visible_candles(8.0, 9.0).is_empty());
    }

    #[test]
    fn test_empty_window() {
        let window = ChartWindow::new("AAPL", Interval::Day1, Vec::new(), TimeRange::new(0, 1));
        assert_eq!(window.time_at_logical(0.0), None);
        assert!(window.visible_candles(0.0, 3.0).is_empty());
        assert_eq!(window.loaded_range(), None);
    }
}
