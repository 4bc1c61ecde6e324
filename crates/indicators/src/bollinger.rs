//! Bollinger bands

use crate::statistics::population_std_dev;
use candle_charts_shared::{BollingerPoint, Candle, IndicatorPoint, IndicatorSeries};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_STD_DEV: f64 = 2.0;

/// Band triplets, one per candle from index `period - 1`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BollingerBands {
    pub points: Vec<BollingerPoint>,
}

impl BollingerBands {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn upper(&self) -> IndicatorSeries {
        self.project(|p| p.upper)
    }

    pub fn middle(&self) -> IndicatorSeries {
        self.project(|p| p.middle)
    }

    pub fn lower(&self) -> IndicatorSeries {
        self.project(|p| p.lower)
    }

    fn project(&self, band: impl Fn(&BollingerPoint) -> f64) -> IndicatorSeries {
        self.points
            .iter()
            .map(|p| IndicatorPoint::new(p.time, Some(band(p))))
            .collect()
    }
}

/// Middle band is the SMA of the window; outer bands sit `std_dev` population
/// deviations of the window closes away from it.
pub fn bollinger_bands(candles: &[Candle], period: usize, std_dev: f64) -> BollingerBands {
    if period < 1 || candles.len() < period {
        return BollingerBands::default();
    }

    let points = candles
        .windows(period)
        .filter_map(|window| {
            let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
            let middle = closes.iter().sum::<f64>() / period as f64;
            let deviation = population_std_dev(&closes)?;
            let time = window[period - 1].time;
            Some(BollingerPoint {
                time,
                upper: middle + std_dev * deviation,
                middle,
                lower: middle - std_dev * deviation,
            })
        })
        .collect();

    BollingerBands { points }
}
