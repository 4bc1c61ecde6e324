//! Peak/trough detection and support/resistance line fitting

use candle_charts_shared::{Candle, Extremum, Trend, TrendLine, TrendLineKind};

/// Trend lines need at least this many candles
pub const MIN_TREND_CANDLES: usize = 10;

/// Relative distance within which a candle counts as touching a line, and the
/// slack allowed before a line counts as crossing price.
const TOLERANCE: f64 = 0.02;

/// Minimum change between first and last close to call a direction
const TREND_THRESHOLD: f64 = 0.02;

/// Extremum window used for trend detection: `max(3, n / 20)`
pub fn default_window_size(candle_count: usize) -> usize {
    (candle_count / 20).max(3)
}

/// Candles whose `low` is not exceeded from below by any other low within
/// `window` positions on either side.
pub fn find_troughs(candles: &[Candle], window: usize) -> Vec<Extremum> {
    find_extrema(candles, window, |c| c.low, |other, own| other < own)
}

/// Candles whose `high` is not exceeded by any other high within `window`
/// positions on either side.
pub fn find_peaks(candles: &[Candle], window: usize) -> Vec<Extremum> {
    find_extrema(candles, window, |c| c.high, |other, own| other > own)
}

fn find_extrema(
    candles: &[Candle],
    window: usize,
    price: impl Fn(&Candle) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<Extremum> {
    let n = candles.len();
    if n <= 2 * window {
        return Vec::new();
    }

    (window..n - window)
        .filter(|&i| {
            let own = price(&candles[i]);
            (i - window..=i + window)
                .filter(|&j| j != i)
                .all(|j| !beats(price(&candles[j]), own))
        })
        .map(|i| Extremum {
            index: i,
            price: price(&candles[i]),
            time: candles[i].time,
        })
        .collect()
}

/// Line through two extrema extended from the first to the last candle
fn line_through(kind: TrendLineKind, a: &Extremum, b: &Extremum, total: usize) -> TrendLine {
    let slope = (b.price - a.price) / (b.index as f64 - a.index as f64);
    let intercept = a.price - slope * a.index as f64;
    let end_index = total.saturating_sub(1);
    TrendLine {
        kind,
        slope,
        intercept,
        start_index: 0,
        end_index,
        start_price: intercept,
        end_price: slope * end_index as f64 + intercept,
        touch_count: 0,
    }
}

fn is_touch(price: f64, line_price: f64) -> bool {
    line_price > 0.0 && (price - line_price).abs() / line_price < TOLERANCE
}

/// Best support line through rising troughs, or `None`.
///
/// A candidate is rejected when it rises more than 2% above any low. Valid
/// candidates need two touches and are scored by touches plus the fraction
/// of the series spanned by its anchors.
pub fn find_uptrend_line(candles: &[Candle]) -> Option<TrendLine> {
    fit_line(candles, TrendLineKind::Support)
}

/// Best resistance line through falling peaks, or `None`.
pub fn find_downtrend_line(candles: &[Candle]) -> Option<TrendLine> {
    fit_line(candles, TrendLineKind::Resistance)
}

fn fit_line(candles: &[Candle], kind: TrendLineKind) -> Option<TrendLine> {
    let n = candles.len();
    if n < MIN_TREND_CANDLES {
        return None;
    }

    let window = default_window_size(n);
    let extrema = match kind {
        TrendLineKind::Support => find_troughs(candles, window),
        TrendLineKind::Resistance => find_peaks(candles, window),
    };
    if extrema.len() < 2 {
        return None;
    }

    let mut best: Option<(f64, TrendLine)> = None;

    for (i, first) in extrema.iter().enumerate() {
        for second in &extrema[i + 1..] {
            let slopes_correctly = match kind {
                TrendLineKind::Support => second.price > first.price,
                TrendLineKind::Resistance => second.price < first.price,
            };
            if !slopes_correctly {
                continue;
            }

            let mut line = line_through(kind, first, second, n);
            let Some(touches) = count_touches(candles, &line) else {
                continue;
            };
            if touches < 2 {
                continue;
            }
            line.touch_count = touches;

            let score = touches as f64 + (second.index - first.index) as f64 / n as f64;
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, line));
            }
        }
    }

    if best.is_none() {
        log::debug!("no valid {kind:?} line among {} extrema", extrema.len());
    }
    best.map(|(_, line)| line)
}

/// Touch count for a line, or `None` when the line crosses price
fn count_touches(candles: &[Candle], line: &TrendLine) -> Option<usize> {
    let mut touches = 0;
    for (k, candle) in candles.iter().enumerate() {
        let line_price = line.price_at(k);
        let price = match line.kind {
            TrendLineKind::Support => {
                if line_price > candle.low * (1.0 + TOLERANCE) {
                    return None;
                }
                candle.low
            }
            TrendLineKind::Resistance => {
                if line_price < candle.high * (1.0 - TOLERANCE) {
                    return None;
                }
                candle.high
            }
        };
        if is_touch(price, line_price) {
            touches += 1;
        }
    }
    Some(touches)
}

/// Direction of the whole series from its first and last close
pub fn detect_trend(candles: &[Candle]) -> Trend {
    let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
        return Trend::Neutral;
    };
    if candles.len() < 2 || first.close == 0.0 {
        return Trend::Neutral;
    }

    let change = (last.close - first.close) / first.close;
    if change > TREND_THRESHOLD {
        Trend::Up
    } else if change < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::candles_from_closes;
    use std::f64::consts::PI;

    fn oscillating(len: usize, base: f64, drift: f64, amplitude: f64) -> Vec<Candle> {
        let closes: Vec<f64> = (0..len)
            .map(|i| {
                let i = i as f64;
                base + drift * i - amplitude * (2.0 * PI * i / 10.0).cos()
            })
            .collect();
        candles_from_closes(&closes)
    }

    #[test]
    fn test_troughs_and_peaks() {
        let candles = candles_from_closes(&[5.0, 4.0, 3.0, 4.0, 5.0, 6.0, 5.0, 4.0, 5.0]);
        let troughs = find_troughs(&candles, 2);
        assert_eq!(troughs.len(), 1);
        assert_eq!(troughs[0].index, 2);
        assert_eq!(troughs[0].price, candles[2].low);

        let peaks = find_peaks(&candles, 2);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 5);
    }

    #[test]
    fn test_extrema_ties_qualify() {
        let candles = candles_from_closes(&[5.0, 3.0, 3.0, 5.0, 6.0]);
        let troughs = find_troughs(&candles, 1);
        let indices: Vec<usize> = troughs.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_window_size() {
        assert_eq!(default_window_size(10), 3);
        assert_eq!(default_window_size(100), 5);
        assert_eq!(default_window_size(419), 20);
    }

    #[test]
    fn test_uptrend_line_through_rising_troughs() {
        let candles = oscillating(40, 100.0, 0.5, 5.0);
        let line = find_uptrend_line(&candles).expect("support line");

        assert_eq!(line.kind, TrendLineKind::Support);
        assert!(line.slope > 0.0);
        assert!(line.touch_count >= 2);
        assert_eq!(line.start_index, 0);
        assert_eq!(line.end_index, 39);
        assert!((line.end_price - line.price_at(39)).abs() < 1e-9);
        for (k, candle) in candles.iter().enumerate() {
            assert!(line.price_at(k) <= candle.low * 1.02);
        }
    }

    #[test]
    fn test_downtrend_line_through_falling_peaks() {
        let candles = oscillating(40, 200.0, -0.5, -5.0);
        let line = find_downtrend_line(&candles).expect("resistance line");

        assert_eq!(line.kind, TrendLineKind::Resistance);
        assert!(line.slope < 0.0);
        assert!(line.touch_count >= 2);
        for (k, candle) in candles.iter().enumerate() {
            assert!(line.price_at(k) >= candle.high * 0.98);
        }
    }

    #[test]
    fn test_no_line_for_short_series() {
        let candles = oscillating(9, 100.0, 0.5, 5.0);
        assert!(find_uptrend_line(&candles).is_none());
        assert!(find_downtrend_line(&candles).is_none());
    }

    #[test]
    fn test_no_line_without_two_extrema() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        assert!(find_troughs(&candles, default_window_size(30)).is_empty());
        assert!(find_uptrend_line(&candles).is_none());
    }

    #[test]
    fn test_detect_trend() {
        assert_eq!(detect_trend(&candles_from_closes(&[100.0, 103.0])), Trend::Up);
        assert_eq!(detect_trend(&candles_from_closes(&[100.0, 97.0])), Trend::Down);
        assert_eq!(detect_trend(&candles_from_closes(&[100.0, 101.0])), Trend::Neutral);
        assert_eq!(detect_trend(&candles_from_closes(&[100.0])), Trend::Neutral);
        assert_eq!(detect_trend(&[]), Trend::Neutral);
    }
}
