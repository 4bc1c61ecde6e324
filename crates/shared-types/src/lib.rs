//! Shared types for the candle charts workspace
//!
//! This crate contains the data model shared by the indicator engine, the
//! data manager and the chart controller: candles, intervals, indicator
//! series, trend lines and the error taxonomy.

use serde::{Deserialize, Serialize};

pub mod candle;
pub mod errors;
pub mod interval;
pub mod series;

pub use candle::Candle;
pub use errors::{ChartsError, FetchError};
pub use interval::{DisplayRange, Interval};
pub use series::{
    BollingerPoint, Extremum, IndicatorPoint, IndicatorSeries, Trend, TrendLine, TrendLineKind,
};

/// Seconds in one calendar day
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Time range in epoch seconds, inclusive on both ends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> i64 {
        self.end.saturating_sub(self.start).max(0)
    }

    /// Span in fractional days
    pub fn days(&self) -> f64 {
        self.duration() as f64 / SECONDS_PER_DAY as f64
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Result type for operations
pub type Result<T> = std::result::Result<T, ChartsError>;
