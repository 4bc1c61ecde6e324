//! Indicator overlays for the active interval
//!
//! Overlay periods are given in trading days and converted to a candle count
//! for the interval on screen, so a 20-day average means the same thing on
//! hourly and daily charts.

use crate::effects::IndicatorOverlays;
use candle_charts_config::IndicatorSettings;
use candle_charts_indicators::{
    bollinger_bands, detect_trend, ema_array, find_downtrend_line, find_uptrend_line, sma_array,
    DEFAULT_BOLLINGER_PERIOD, MIN_TREND_CANDLES,
};
use candle_charts_shared::{Candle, IndicatorSeries, Interval, Trend};

/// Candle count covering `trading_days` at `interval`, never below 2
pub fn adjusted_period(trading_days: usize, interval: Interval) -> usize {
    let candles = (trading_days as f64 / interval.trading_days_per_candle()).round();
    (candles as usize).max(2)
}

/// Moving-average overlays are too noisy to draw on 5m and 15m charts
pub fn mas_enabled(interval: Interval) -> bool {
    !matches!(interval, Interval::Min5 | Interval::Min15)
}

fn sma_overlay(candles: &[Candle], trading_days: usize, interval: Interval) -> Option<IndicatorSeries> {
    let period = adjusted_period(trading_days, interval);
    (candles.len() >= period).then(|| sma_array(candles, period))
}

/// Recomputes every enabled overlay from scratch
pub fn compute_overlays(
    candles: &[Candle],
    interval: Interval,
    settings: &IndicatorSettings,
) -> IndicatorOverlays {
    let mut overlays = IndicatorOverlays::default();

    if mas_enabled(interval) {
        if settings.ma5 {
            overlays.ma5 = sma_overlay(candles, 5, interval);
        }
        if settings.ma20 {
            overlays.ma20 = sma_overlay(candles, 20, interval);
        }
        if settings.ma50 {
            overlays.ma50 = sma_overlay(candles, 50, interval);
        }
        if settings.ma200 {
            overlays.ma200 = sma_overlay(candles, 200, interval);
        }
        if settings.ema20 {
            let period = adjusted_period(20, interval);
            if candles.len() >= period {
                overlays.ema20 = Some(ema_array(candles, period));
            }
        }
        if settings.bollinger {
            let period = adjusted_period(20, interval).max(DEFAULT_BOLLINGER_PERIOD);
            if candles.len() >= period {
                let bands = bollinger_bands(candles, period, settings.bollinger_std_dev);
                overlays.bollinger_upper = Some(bands.upper());
                overlays.bollinger_lower = Some(bands.lower());
            }
        }
    }

    if settings.trendlines && candles.len() >= MIN_TREND_CANDLES {
        overlays.trendline = match detect_trend(candles) {
            Trend::Up => find_uptrend_line(candles),
            Trend::Down => find_downtrend_line(candles),
            Trend::Neutral => None,
        };
    }

    overlays
}
