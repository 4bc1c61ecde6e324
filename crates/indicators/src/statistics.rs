//! Return and range statistics

use crate::tail;
use candle_charts_shared::Candle;

/// Percent change of the latest close against the close `period` candles earlier
pub fn percent_change(candles: &[Candle], period: usize) -> Option<f64> {
    if period < 1 || candles.len() < period + 1 {
        return None;
    }
    let current = candles[candles.len() - 1].close;
    let past = candles[candles.len() - 1 - period].close;
    if past == 0.0 {
        return None;
    }
    Some((current - past) / past * 100.0)
}

/// Highest `high` over the last `period` candles
pub fn highest_high(candles: &[Candle], period: usize) -> Option<f64> {
    tail(candles, period)?
        .iter()
        .map(|c| c.high)
        .reduce(f64::max)
}

/// Lowest `low` over the last `period` candles
pub fn lowest_low(candles: &[Candle], period: usize) -> Option<f64> {
    tail(candles, period)?.iter().map(|c| c.low).reduce(f64::min)
}

/// Population standard deviation, `None` for an empty slice
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Standard deviation of simple returns over the last `period + 1` candles.
///
/// Steps whose previous close is zero are skipped. At least two returns must
/// survive for a result.
pub fn volatility(candles: &[Candle], period: usize) -> Option<f64> {
    if period < 2 {
        return None;
    }
    let window = tail(candles, period + 1)?;

    let returns: Vec<f64> = window
        .windows(2)
        .filter(|pair| pair[0].close != 0.0)
        .map(|pair| (pair[1].close - pair[0].close) / pair[0].close)
        .collect();

    if returns.len() < 2 {
        return None;
    }
    population_std_dev(&returns)
}
