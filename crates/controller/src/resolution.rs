//! Interval resolution
//!
//! Maps display ranges and visible spans to sampling intervals and decides,
//! with hysteresis, when a zoom warrants switching interval.

use candle_charts_config::HysteresisConfig;
use candle_charts_shared::{DisplayRange, Interval, TimeRange, SECONDS_PER_DAY};

/// Interval for a range key such as `5d` or `ytd`. Unknown keys fall back to daily.
pub fn interval_for_display_range(range: &str) -> Interval {
    range
        .parse::<DisplayRange>()
        .map(|range| range.interval())
        .unwrap_or(Interval::Day1)
}

/// Finest interval that is still practical for a visible span
pub fn best_interval_for_visible_span(seconds: i64) -> Interval {
    let days = seconds as f64 / SECONDS_PER_DAY as f64;
    if days <= 2.0 {
        Interval::Min5
    } else if days <= 10.0 {
        Interval::Min15
    } else if days <= 60.0 {
        Interval::Hour1
    } else if days <= 400.0 {
        Interval::Day1
    } else if days <= 2000.0 {
        Interval::Week1
    } else {
        Interval::Month1
    }
}

/// Whether to leave `current` for `best` at this visible span.
///
/// Moving coarser requires the span to exceed the current interval's upper
/// threshold; moving finer requires it to drop below the lower threshold. A
/// missing band or threshold blocks the move, so the answer can disagree
/// with [`best_interval_for_visible_span`] near a boundary.
pub fn should_switch_interval(
    current: Interval,
    best: Interval,
    visible_seconds: i64,
    hysteresis: &HysteresisConfig,
) -> bool {
    if current == best {
        return false;
    }
    let Some(band) = hysteresis.band(current) else {
        return false;
    };

    let visible_days = visible_seconds as f64 / SECONDS_PER_DAY as f64;
    if best > current {
        band.upper_days.is_some_and(|upper| visible_days > upper)
    } else {
        band.lower_days.is_some_and(|lower| visible_days < lower)
    }
}

/// [`should_switch_interval`] over provider keys; unrecognized keys never switch
pub fn should_switch_interval_keys(
    current: &str,
    best: &str,
    visible_seconds: i64,
    hysteresis: &HysteresisConfig,
) -> bool {
    match (current.parse::<Interval>(), best.parse::<Interval>()) {
        (Ok(current), Ok(best)) => should_switch_interval(current, best, visible_seconds, hysteresis),
        _ => false,
    }
}

pub fn is_intraday_interval(interval: Interval) -> bool {
    interval.is_intraday()
}

/// Intraday intervals are unavailable once the range starts more than
/// `intraday_limit_days` before `now`; other intervals are always valid.
pub fn is_interval_valid_for_range(
    interval: Interval,
    range: TimeRange,
    now: i64,
    intraday_limit_days: u32,
) -> bool {
    if !is_intraday_interval(interval) {
        return true;
    }
    let limit = now - i64::from(intraday_limit_days) * SECONDS_PER_DAY;
    range.start >= limit
}

/// Validity of every interval for a range, finest first
pub fn interval_validity(
    range: TimeRange,
    now: i64,
    intraday_limit_days: u32,
) -> Vec<(Interval, bool)> {
    Interval::ALL
        .iter()
        .map(|&interval| {
            (
                interval,
                is_interval_valid_for_range(interval, range, now, intraday_limit_days),
            )
        })
        .collect()
}
