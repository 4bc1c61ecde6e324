//! Common error types used across all candle charts crates

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure reported by the market-data collaborator
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum FetchError {
    /// Provider has no candles for the requested window
    #[error("No data available for {symbol}")]
    NoData { symbol: String },

    /// Provider is throttling requests
    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other provider or payload failure
    #[error("Provider request failed: {message}")]
    Provider { message: String },
}

impl FetchError {
    pub fn no_data(symbol: impl Into<String>) -> Self {
        FetchError::NoData {
            symbol: symbol.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        FetchError::Provider {
            message: message.into(),
        }
    }

    /// Errors that mean "the series has nothing more to give".
    ///
    /// Rate limiting is transient and does not exhaust a series.
    pub fn is_exhaustion(&self) -> bool {
        !self.is_rate_limited()
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }
}

/// Base error type for candle charts operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unknown interval: {0}")]
    UnknownInterval(String),

    #[error("Unknown display range: {0}")]
    UnknownRange(String),

    #[error("Payload parse error: {message}")]
    Parse { message: String },

    #[error("Chart not found: {id}")]
    ChartNotFound { id: String },
}

impl From<serde_json::Error> for ChartsError {
    fn from(err: serde_json::Error) -> Self {
        ChartsError::Parse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_classification() {
        assert!(FetchError::no_data("AAPL").is_exhaustion());
        assert!(FetchError::provider("HTTP 500").is_exhaustion());

        let limited = FetchError::RateLimited { retry_after: None };
        assert!(limited.is_rate_limited());
        assert!(!limited.is_exhaustion());
    }

    #[test]
    fn test_display() {
        let err: ChartsError = FetchError::no_data("MSFT").into();
        assert_eq!(err.to_string(), "No data available for MSFT");
        assert_eq!(
            ChartsError::UnknownInterval("2h".into()).to_string(),
            "Unknown interval: 2h"
        );
    }
}
