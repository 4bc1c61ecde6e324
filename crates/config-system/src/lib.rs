//! Configuration system for candle charts
//! Holds the tunable loading constants, hysteresis bands, overlay toggles and
//! cache settings, with file loading and validation.

use candle_charts_shared::Interval;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub mod parser;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser, ConfigSerializer};
pub use validation::ConfigValidator;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration for a chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub loading: LoadingConfig,
    pub hysteresis: HysteresisConfig,
    pub indicators: IndicatorSettings,
    pub cache: CacheConfig,
}

/// Data-loading behaviour of the chart controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Candles from the left edge that trigger a historical backfill
    pub load_more_threshold: usize,
    /// Padding on each side of the visible span, as a fraction of it
    pub fetch_padding_multiplier: f64,
    /// Minimum candles an interval-switch window must cover
    pub min_candles_fetch: usize,
    /// Pan/zoom events are ignored for this long after a render
    pub debounce_ms: u64,
    /// Minimum gap between consecutive backfills
    pub throttle_ms: u64,
    /// Provider lookback limit for intraday intervals
    pub intraday_limit_days: u32,
    /// Automatic backfill rechecks allowed per viewport change
    pub max_backfill_attempts: u32,
    /// Switch interval automatically while zooming
    pub auto_interval_switch: bool,
    pub rate_limit_backoff_ms: u64,
    pub rate_limit_backoff_max_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            load_more_threshold: 5,
            fetch_padding_multiplier: 0.5,
            min_candles_fetch: 20,
            debounce_ms: 500,
            throttle_ms: 1000,
            intraday_limit_days: 60,
            max_backfill_attempts: 10,
            auto_interval_switch: true,
            rate_limit_backoff_ms: 1000,
            rate_limit_backoff_max_ms: 60_000,
        }
    }
}

impl LoadingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Backoff before the `attempt`-th retry (1-based): doubles from the base
    /// up to the cap.
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self
            .rate_limit_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.rate_limit_backoff_max_ms);
        Duration::from_millis(delay)
    }
}

/// Day thresholds for leaving an interval.
///
/// Above `upper_days` a coarser interval is allowed; below `lower_days` a
/// finer one. A missing threshold blocks travel in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HysteresisBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_days: Option<f64>,
}

impl HysteresisBand {
    pub const fn new(lower_days: Option<f64>, upper_days: Option<f64>) -> Self {
        Self {
            lower_days,
            upper_days,
        }
    }
}

/// Per-interval hysteresis bands.
///
/// Bands given in a config file override the defaults interval by interval;
/// intervals not mentioned keep their default band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Interval, HysteresisBand>", into = "BTreeMap<Interval, HysteresisBand>")]
pub struct HysteresisConfig {
    bands: BTreeMap<Interval, HysteresisBand>,
}

impl HysteresisConfig {
    pub fn band(&self, interval: Interval) -> Option<&HysteresisBand> {
        self.bands.get(&interval)
    }

    pub fn set_band(&mut self, interval: Interval, band: HysteresisBand) {
        self.bands.insert(interval, band);
    }

    pub fn remove_band(&mut self, interval: Interval) {
        self.bands.remove(&interval);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Interval, &HysteresisBand)> {
        self.bands.iter()
    }
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        let bands = [
            (Interval::Min5, HysteresisBand::new(None, Some(3.0))),
            (Interval::Min15, HysteresisBand::new(Some(1.0), Some(14.0))),
            (Interval::Min30, HysteresisBand::new(Some(3.0), Some(30.0))),
            (Interval::Hour1, HysteresisBand::new(Some(5.0), Some(90.0))),
            (Interval::Hour4, HysteresisBand::new(Some(20.0), Some(200.0))),
            (Interval::Day1, HysteresisBand::new(Some(14.0), Some(800.0))),
            (Interval::Week1, HysteresisBand::new(Some(300.0), Some(3000.0))),
            (Interval::Month1, HysteresisBand::new(Some(1500.0), None)),
        ];
        Self {
            bands: bands.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<Interval, HysteresisBand>> for HysteresisConfig {
    fn from(overrides: BTreeMap<Interval, HysteresisBand>) -> Self {
        let mut config = Self::default();
        config.bands.extend(overrides);
        config
    }
}

impl From<HysteresisConfig> for BTreeMap<Interval, HysteresisBand> {
    fn from(config: HysteresisConfig) -> Self {
        config.bands
    }
}

/// Which overlays the chart draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ma5: bool,
    pub ma20: bool,
    pub ma50: bool,
    pub ma200: bool,
    pub ema20: bool,
    pub bollinger: bool,
    pub trendlines: bool,
    pub bollinger_std_dev: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma5: false,
            ma20: false,
            ma50: false,
            ma200: false,
            ema20: false,
            bollinger: false,
            trendlines: false,
            bollinger_std_dev: 2.0,
        }
    }
}

impl IndicatorSettings {
    /// Every overlay enabled
    pub fn all() -> Self {
        Self {
            ma5: true,
            ma20: true,
            ma50: true,
            ma200: true,
            ema20: true,
            bollinger: true,
            trendlines: true,
            ..Self::default()
        }
    }
}

/// Response cache sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChartConfig::default();
        assert_eq!(config.loading.load_more_threshold, 5);
        assert_eq!(config.loading.min_candles_fetch, 20);
        assert_eq!(config.loading.debounce(), Duration::from_millis(500));
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert!(!config.indicators.ma20);

        let daily = config.hysteresis.band(Interval::Day1).unwrap();
        assert_eq!(daily.lower_days, Some(14.0));
        assert_eq!(daily.upper_days, Some(800.0));
        assert_eq!(config.hysteresis.band(Interval::Min5).unwrap().lower_days, None);
    }

    #[test]
    fn test_backoff_doubles_to_cap() {
        let loading = LoadingConfig::default();
        assert_eq!(loading.rate_limit_backoff(1), Duration::from_secs(1));
        assert_eq!(loading.rate_limit_backoff(2), Duration::from_secs(2));
        assert_eq!(loading.rate_limit_backoff(4), Duration::from_secs(8));
        assert_eq!(loading.rate_limit_backoff(7), Duration::from_secs(60));
        assert_eq!(loading.rate_limit_backoff(100), Duration::from_secs(60));
    }

    #[test]
    fn test_hysteresis_overrides_merge_with_defaults() {
        let json = r#"{"hysteresis": {"1d": {"lower_days": 10.0, "upper_days": 500.0}}}"#;
        let config: ChartConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.hysteresis.band(Interval::Day1),
            Some(&HysteresisBand::new(Some(10.0), Some(500.0)))
        );
        assert_eq!(
            config.hysteresis.band(Interval::Week1),
            Some(&HysteresisBand::new(Some(300.0), Some(3000.0)))
        );
    }
}
