//! One-shot summary of the standard indicators for a candle series

use crate::moving_average::sma;
use crate::statistics::{highest_high, lowest_low, percent_change, volatility};
use candle_charts_shared::Candle;
use serde::{Deserialize, Serialize};

/// Latest values of the standard indicator set; absent where data is short
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub sma5: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub percent_change5: Option<f64>,
    pub percent_change20: Option<f64>,
    pub highest_high20: Option<f64>,
    pub lowest_low20: Option<f64>,
    pub volatility20: Option<f64>,
}

pub fn compute_all(candles: &[Candle]) -> IndicatorSnapshot {
    IndicatorSnapshot {
        sma5: sma(candles, 5),
        sma20: sma(candles, 20),
        sma50: sma(candles, 50),
        sma200: sma(candles, 200),
        percent_change5: percent_change(candles, 5),
        percent_change20: percent_change(candles, 20),
        highest_high20: highest_high(candles, 20),
        lowest_low20: lowest_low(candles, 20),
        volatility20: volatility(candles, 20),
    }
}
