//! Indicator engine for candle charts
//!
//! Pure functions over candle slices: moving averages, Bollinger bands,
//! return statistics and trend-line fitting. Nothing here holds state or
//! performs I/O. Insufficient data is reported as `None` or as absent series
//! values, never as an error.

pub mod bollinger;
pub mod moving_average;
pub mod snapshot;
pub mod statistics;
pub mod trend;

pub use bollinger::{bollinger_bands, BollingerBands, DEFAULT_BOLLINGER_PERIOD, DEFAULT_STD_DEV};
pub use moving_average::{ema, ema_array, sma, sma_array};
pub use snapshot::{compute_all, IndicatorSnapshot};
pub use statistics::{highest_high, lowest_low, percent_change, population_std_dev, volatility};
pub use trend::{
    default_window_size, detect_trend, find_downtrend_line, find_peaks, find_troughs,
    find_uptrend_line, MIN_TREND_CANDLES,
};

use candle_charts_shared::Candle;

/// Closing prices of the last `period` candles, or `None` when there are fewer.
pub(crate) fn tail(candles: &[Candle], period: usize) -> Option<&[Candle]> {
    if period < 1 || candles.len() < period {
        return None;
    }
    Some(&candles[candles.len() - period..])
}
