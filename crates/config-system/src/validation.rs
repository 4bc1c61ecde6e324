//! Configuration validation utilities

use crate::{CacheConfig, ChartConfig, ConfigError, HysteresisConfig, IndicatorSettings, LoadingConfig, Result};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &ChartConfig) -> Result<()> {
        Self::validate_loading(&config.loading)?;
        Self::validate_hysteresis(&config.hysteresis)?;
        Self::validate_indicators(&config.indicators)?;
        Self::validate_cache(&config.cache)?;
        Ok(())
    }

    fn validate_loading(loading: &LoadingConfig) -> Result<()> {
        if loading.load_more_threshold == 0 {
            return Err(ConfigError::Validation(
                "load_more_threshold must be at least 1 candle".to_string(),
            ));
        }

        if !(0.0..=10.0).contains(&loading.fetch_padding_multiplier) {
            return Err(ConfigError::Validation(format!(
                "Invalid fetch_padding_multiplier: {}. Must be between 0.0 and 10.0",
                loading.fetch_padding_multiplier
            )));
        }

        if loading.min_candles_fetch == 0 {
            return Err(ConfigError::Validation(
                "min_candles_fetch must be at least 1".to_string(),
            ));
        }

        if loading.throttle_ms == 0 {
            return Err(ConfigError::Validation(
                "throttle_ms must be positive".to_string(),
            ));
        }

        if loading.intraday_limit_days == 0 {
            return Err(ConfigError::Validation(
                "intraday_limit_days must be positive".to_string(),
            ));
        }

        if loading.max_backfill_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_backfill_attempts must be at least 1".to_string(),
            ));
        }

        if loading.rate_limit_backoff_ms == 0 {
            return Err(ConfigError::Validation(
                "rate_limit_backoff_ms must be positive".to_string(),
            ));
        }

        if loading.rate_limit_backoff_max_ms < loading.rate_limit_backoff_ms {
            return Err(ConfigError::Validation(format!(
                "rate_limit_backoff_max_ms ({}) is below rate_limit_backoff_ms ({})",
                loading.rate_limit_backoff_max_ms, loading.rate_limit_backoff_ms
            )));
        }

        Ok(())
    }

    fn validate_hysteresis(hysteresis: &HysteresisConfig) -> Result<()> {
        for (interval, band) in hysteresis.iter() {
            for (name, value) in [("lower_days", band.lower_days), ("upper_days", band.upper_days)] {
                if let Some(days) = value {
                    if !days.is_finite() || days <= 0.0 {
                        return Err(ConfigError::Validation(format!(
                            "Invalid {name} for {interval}: {days}. Must be a positive number of days"
                        )));
                    }
                }
            }

            if let (Some(lower), Some(upper)) = (band.lower_days, band.upper_days) {
                if lower >= upper {
                    return Err(ConfigError::Validation(format!(
                        "Inverted hysteresis band for {interval}: lower {lower} >= upper {upper}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_indicators(indicators: &IndicatorSettings) -> Result<()> {
        if !indicators.bollinger_std_dev.is_finite() || indicators.bollinger_std_dev <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "Invalid bollinger_std_dev: {}. Must be positive",
                indicators.bollinger_std_dev
            )));
        }
        Ok(())
    }

    fn validate_cache(cache: &CacheConfig) -> Result<()> {
        if cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "cache capacity must be at least 1 entry".to_string(),
            ));
        }
        Ok(())
    }
}
