//! Derived series produced by the indicator engine

use serde::{Deserialize, Serialize};

/// One point of an indicator aligned to a candle.
///
/// `value` is `None` where the lookback window is not yet full, so the render
/// layer can skip drawing that point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorPoint {
    pub time: i64,
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn new(time: i64, value: Option<f64>) -> Self {
        Self { time, value }
    }
}

/// Indicator values aligned one-to-one with a candle sequence
pub type IndicatorSeries = Vec<IndicatorPoint>;

/// Bollinger band triplet for a single candle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BollingerPoint {
    pub time: i64,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Local extremum found by peak/trough detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Extremum {
    pub index: usize,
    pub price: f64,
    pub time: i64,
}

/// Which side of price a trend line bounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendLineKind {
    /// Drawn through troughs, below price
    Support,
    /// Drawn through peaks, above price
    Resistance,
}

/// Line fitted through two extrema and extended across the whole candle span.
///
/// Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendLine {
    pub kind: TrendLineKind,
    pub slope: f64,
    pub intercept: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub start_price: f64,
    pub end_price: f64,
    /// Candles within tolerance of the line
    pub touch_count: usize,
}

impl TrendLine {
    /// Price of the line at a candle index
    pub fn price_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

/// Overall direction of a candle sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}
