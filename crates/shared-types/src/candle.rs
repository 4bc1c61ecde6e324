//! OHLCV candle type

use serde::{Deserialize, Serialize};

/// One OHLCV price bar for a fixed time bucket.
///
/// `time` is the bucket start in epoch seconds. A well-formed candle satisfies
/// `low <= min(open, close) <= max(open, close) <= high`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Flat candle where every price equals `price`
    pub fn flat(time: i64, price: f64, volume: u64) -> Self {
        Self::new(time, price, price, price, price, volume)
    }

    /// All prices are finite numbers
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// Checks the OHLC ordering invariant
    pub fn is_consistent(&self) -> bool {
        self.is_finite()
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

/// True when times are strictly ascending with no duplicates
pub fn is_strictly_ascending(candles: &[Candle]) -> bool {
    candles.windows(2).all(|pair| pair[0].time < pair[1].time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency() {
        assert!(Candle::new(0, 10.0, 12.0, 9.0, 11.0, 100).is_consistent());
        assert!(!Candle::new(0, 10.0, 10.5, 9.0, 11.0, 100).is_consistent());
        assert!(!Candle::new(0, 10.0, 12.0, 10.5, 11.0, 100).is_consistent());
        assert!(!Candle::new(0, f64::NAN, 12.0, 9.0, 11.0, 100).is_consistent());
    }

    #[test]
    fn test_ordering_check() {
        let candles = vec![Candle::flat(1, 1.0, 0), Candle::flat(2, 1.0, 0)];
        assert!(is_strictly_ascending(&candles));

        let duplicated = vec![Candle::flat(1, 1.0, 0), Candle::flat(1, 1.0, 0)];
        assert!(!is_strictly_ascending(&duplicated));
    }
}
