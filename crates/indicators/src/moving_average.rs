//! Simple and exponential moving averages

use crate::tail;
use candle_charts_shared::{Candle, IndicatorPoint, IndicatorSeries};

/// Mean of the last `period` closes
pub fn sma(candles: &[Candle], period: usize) -> Option<f64> {
    let window = tail(candles, period)?;
    let sum: f64 = window.iter().map(|c| c.close).sum();
    Some(sum / period as f64)
}

/// SMA evaluated at every candle position.
///
/// Positions before the window fills carry no value. An empty series is
/// returned for `period < 1`.
pub fn sma_array(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period < 1 {
        return Vec::new();
    }

    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let value = if i + 1 >= period {
                sma(&candles[..=i], period)
            } else {
                None
            };
            IndicatorPoint::new(candle.time, value)
        })
        .collect()
}

/// EMA seeded with the first close, `k = 2 / (period + 1)`.
///
/// The recursion runs over every candle but values are only exposed from
/// index `period - 1` onward.
pub fn ema_array(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period < 1 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut current: Option<f64> = None;

    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let next = match current {
                None => candle.close,
                Some(prev) => candle.close * k + prev * (1.0 - k),
            };
            current = Some(next);
            let value = (i + 1 >= period).then_some(next);
            IndicatorPoint::new(candle.time, value)
        })
        .collect()
}

/// Latest EMA value, `None` until `period` candles are available
pub fn ema(candles: &[Candle], period: usize) -> Option<f64> {
    ema_array(candles, period).last().and_then(|point| point.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::candles_from_closes;

    #[test]
    fn test_sma_of_last_period() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sma(&candles, 5), Some(3.0));
        assert_eq!(sma(&candles, 2), Some(4.5));
        assert_eq!(sma(&candles, 6), None);
        assert_eq!(sma(&candles, 0), None);
    }

    #[test]
    fn test_sma_array_alignment() {
        let candles = candles_from_closes(&[2.0, 4.0, 6.0, 8.0]);
        let series = sma_array(&candles, 3);

        assert_eq!(series.len(), candles.len());
        assert_eq!(series[0].value, None);
        assert_eq!(series[1].value, None);
        assert_eq!(series[2].value, Some(4.0));
        assert_eq!(series[3].value, Some(6.0));
        assert_eq!(series[3].time, candles[3].time);
        assert!(sma_array(&candles, 0).is_empty());
    }

    #[test]
    fn test_sma_matches_last_array_value() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.37).sin() * 9.0).collect();
        let candles = candles_from_closes(&closes);
        for period in [1, 5, 20, 50, 120] {
            let last = sma_array(&candles, period).last().and_then(|p| p.value);
            let scalar = sma(&candles, period);
            assert!((last.unwrap() - scalar.unwrap()).abs() < 1e-9, "period {period}");
        }
    }

    #[test]
    fn test_ema_constant_series() {
        let candles = candles_from_closes(&[42.0; 30]);
        let series = ema_array(&candles, 10);

        assert!(series[..9].iter().all(|p| p.value.is_none()));
        for point in &series[9..] {
            assert!((point.value.unwrap() - 42.0).abs() < 1e-9);
        }
        assert!((ema(&candles, 10).unwrap() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_ema_recursion() {
        let candles = candles_from_closes(&[10.0, 20.0, 30.0]);
        let series = ema_array(&candles, 3);
        // k = 0.5: 10 -> 15 -> 22.5
        assert_eq!(series[2].value, Some(22.5));
        assert_eq!(ema(&candles[..2], 3), None);
    }
}
