//! Provider chart payload parsing
//!
//! The provider returns columnar data: one timestamp array and parallel,
//! nullable open/high/low/close/volume arrays.

use candle_charts_shared::{Candle, ChartsError, FetchError};
use serde::{Deserialize, Serialize};

/// Top-level chart response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ProviderError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: QuoteIndicators,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Parallel OHLCV columns; any entry may be null
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl QuoteColumns {
    /// Builds candles row by row.
    ///
    /// Rows without both open and close are dropped. Missing high/low are
    /// taken from open/close, and high/low are widened to cover open/close.
    /// Missing volume counts as zero.
    pub fn to_candles(&self, timestamps: &[i64]) -> Vec<Candle> {
        let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        let mut dropped = 0usize;
        let candles: Vec<Candle> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &time)| {
                let (Some(open), Some(close)) = (column(&self.open, i), column(&self.close, i)) else {
                    dropped += 1;
                    return None;
                };
                if !open.is_finite() || !close.is_finite() {
                    dropped += 1;
                    return None;
                }

                let body_high = open.max(close);
                let body_low = open.min(close);
                let high = column(&self.high, i)
                    .filter(|h| h.is_finite())
                    .map_or(body_high, |h| h.max(body_high));
                let low = column(&self.low, i)
                    .filter(|l| l.is_finite())
                    .map_or(body_low, |l| l.min(body_low));
                let volume = column(&self.volume, i)
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .map_or(0, |v| v.round() as u64);

                Some(Candle::new(time, open, high, low, close, volume))
            })
            .collect();

        if dropped > 0 {
            log::debug!("dropped {dropped} malformed rows from payload");
        }
        candles
    }
}

impl ChartResponse {
    pub fn from_json(json: &str) -> Result<Self, ChartsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Extracts a normalized candle series.
    ///
    /// A provider error or a missing result fails as no-data. Rate limiting
    /// reported through the error code maps to [`FetchError::RateLimited`].
    pub fn into_candles(self, symbol: &str) -> Result<Vec<Candle>, FetchError> {
        if let Some(error) = self.chart.error {
            if error.code.eq_ignore_ascii_case("Too Many Requests") {
                return Err(FetchError::RateLimited { retry_after: None });
            }
            return Err(FetchError::provider(match error.description {
                Some(description) => format!("{}: {description}", error.code),
                None => error.code,
            }));
        }

        let result = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| FetchError::no_data(symbol))?;

        let candles = result
            .indicators
            .quote
            .first()
            .map(|quote| quote.to_candles(&result.timestamp))
            .unwrap_or_default();

        Ok(normalize(candles))
    }
}

/// Parses a raw payload straight to candles
pub fn parse_chart_payload(json: &str, symbol: &str) -> Result<Vec<Candle>, ChartsError> {
    Ok(ChartResponse::from_json(json)?.into_candles(symbol)?)
}

/// Sorts by time and removes duplicate timestamps, keeping the first occurrence
pub fn normalize(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.time);
    candles.dedup_by_key(|c| c.time);
    candles
}
