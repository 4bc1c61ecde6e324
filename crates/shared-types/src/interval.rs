//! Sampling intervals and predefined display ranges

use crate::errors::ChartsError;
use crate::SECONDS_PER_DAY;
use chrono::{DateTime, Datelike, Days, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle sampling granularity.
///
/// Variants are declared finest to coarsest so the derived `Ord` is the total
/// order used by hysteresis comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Interval {
    /// All intervals, finest first
    pub const ALL: [Interval; 8] = [
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Hour1,
        Interval::Hour4,
        Interval::Day1,
        Interval::Week1,
        Interval::Month1,
    ];

    /// Provider key for this interval
    pub fn key(&self) -> &'static str {
        match self {
            Interval::Min5 => "5m",
            Interval::Min15 => "15m",
            Interval::Min30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
        }
    }

    /// Nominal duration of one candle in seconds. Months count as 30 days.
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::Min5 => 5 * 60,
            Interval::Min15 => 15 * 60,
            Interval::Min30 => 30 * 60,
            Interval::Hour1 => 60 * 60,
            Interval::Hour4 => 4 * 60 * 60,
            Interval::Day1 => SECONDS_PER_DAY,
            Interval::Week1 => 7 * SECONDS_PER_DAY,
            Interval::Month1 => 30 * SECONDS_PER_DAY,
        }
    }

    /// Intraday intervals are subject to the provider's lookback limit
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Interval::Min5 | Interval::Min15 | Interval::Min30 | Interval::Hour1 | Interval::Hour4
        )
    }

    /// Interval actually requested from the provider.
    ///
    /// The provider has no 4-hour candles; those are built from hourly data.
    pub fn fetch_interval(&self) -> Interval {
        match self {
            Interval::Hour4 => Interval::Hour1,
            other => *other,
        }
    }

    /// Whether fetched candles must be aggregated into this interval
    pub fn is_derived(&self) -> bool {
        self.fetch_interval() != *self
    }

    /// Trading days covered by one candle, assuming a 6.5 hour session
    pub fn trading_days_per_candle(&self) -> f64 {
        match self {
            Interval::Min5 => 1.0 / 78.0,
            Interval::Min15 => 1.0 / 26.0,
            Interval::Min30 => 1.0 / 13.0,
            Interval::Hour1 => 1.0 / 6.5,
            Interval::Hour4 => 4.0 / 6.5,
            Interval::Day1 => 1.0,
            Interval::Week1 => 5.0,
            Interval::Month1 => 21.0,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Interval {
    type Err = ChartsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|interval| interval.key() == s)
            .ok_or_else(|| ChartsError::UnknownInterval(s.to_string()))
    }
}

/// Predefined display ranges offered by the range selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl DisplayRange {
    pub const ALL: [DisplayRange; 8] = [
        DisplayRange::OneDay,
        DisplayRange::FiveDays,
        DisplayRange::OneMonth,
        DisplayRange::SixMonths,
        DisplayRange::YearToDate,
        DisplayRange::OneYear,
        DisplayRange::FiveYears,
        DisplayRange::Max,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DisplayRange::OneDay => "1d",
            DisplayRange::FiveDays => "5d",
            DisplayRange::OneMonth => "1mo",
            DisplayRange::SixMonths => "6mo",
            DisplayRange::YearToDate => "ytd",
            DisplayRange::OneYear => "1y",
            DisplayRange::FiveYears => "5y",
            DisplayRange::Max => "max",
        }
    }

    /// Sampling interval the provider uses for this range
    pub fn interval(&self) -> Interval {
        match self {
            DisplayRange::OneDay => Interval::Min5,
            DisplayRange::FiveDays => Interval::Min15,
            DisplayRange::OneMonth
            | DisplayRange::SixMonths
            | DisplayRange::YearToDate
            | DisplayRange::OneYear => Interval::Day1,
            DisplayRange::FiveYears => Interval::Week1,
            DisplayRange::Max => Interval::Month1,
        }
    }

    /// Requested window `[start, now]` in epoch seconds. `Max` starts at the epoch.
    pub fn window(&self, now: i64) -> (i64, i64) {
        let Some(now_dt) = Utc.timestamp_opt(now, 0).single() else {
            return (0, now);
        };
        let start: Option<DateTime<Utc>> = match self {
            DisplayRange::OneDay => now_dt.checked_sub_days(Days::new(1)),
            DisplayRange::FiveDays => now_dt.checked_sub_days(Days::new(5)),
            DisplayRange::OneMonth => now_dt.checked_sub_months(Months::new(1)),
            DisplayRange::SixMonths => now_dt.checked_sub_months(Months::new(6)),
            DisplayRange::YearToDate => Utc
                .with_ymd_and_hms(now_dt.year(), 1, 1, 0, 0, 0)
                .single(),
            DisplayRange::OneYear => now_dt.checked_sub_months(Months::new(12)),
            DisplayRange::FiveYears => now_dt.checked_sub_months(Months::new(60)),
            DisplayRange::Max => None,
        };
        (start.map(|dt| dt.timestamp()).unwrap_or(0), now)
    }
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DisplayRange {
    type Err = ChartsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayRange::ALL
            .iter()
            .copied()
            .find(|range| range.key() == s)
            .ok_or_else(|| ChartsError::UnknownRange(s.to_string()))
    }
}
