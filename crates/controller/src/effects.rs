//! Inputs to and effects produced by the chart controller

use candle_charts_data::FetchRequest;
use candle_charts_shared::{
    Candle, DisplayRange, IndicatorSeries, Interval, TimeRange, TrendLine,
};
use serde::Serialize;
use std::time::Duration;

/// Why a fetch was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchPurpose {
    Initial,
    Backfill,
    IntervalSwitch,
}

/// Identifies one in-flight fetch.
///
/// Results are only applied when the ticket matches the controller's
/// in-flight ticket, which rules out responses from a closed or reopened
/// chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FetchTicket {
    pub id: u64,
    pub generation: u64,
    pub purpose: FetchPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    /// End of the post-render debounce; pan/zoom handling starts after it
    InteractionArmed,
    /// End of the backfill throttle; the left edge is checked again
    BackfillRecheck,
    /// End of a rate-limit backoff
    RateLimitCooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Timer {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Work the caller must carry out on the controller's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load a predefined range at that range's interval
    FetchRange {
        ticket: FetchTicket,
        symbol: String,
        range: DisplayRange,
    },
    /// Load an explicit window; derived intervals must be aggregated
    FetchWindow {
        ticket: FetchTicket,
        request: FetchRequest,
    },
    /// Call back into the controller with `timer` after `after`
    Schedule { timer: Timer, after: Duration },
    /// Hand a fresh snapshot to the render layer
    Render(Box<RenderSnapshot>),
    /// Set the render layer's visible time range
    RestoreVisibleRange(TimeRange),
}

impl Effect {
    pub fn ticket(&self) -> Option<FetchTicket> {
        match self {
            Effect::FetchRange { ticket, .. } | Effect::FetchWindow { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

/// Which range selector state the chart is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeSelection {
    Preset(DisplayRange),
    /// The user panned or zoomed away from any preset
    Custom,
}

/// Visible logical index range reported by the render layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportChange {
    pub logical_from: f64,
    pub logical_to: f64,
    /// False for programmatic changes such as a restored range
    pub user_initiated: bool,
}

impl ViewportChange {
    pub fn user(logical_from: f64, logical_to: f64) -> Self {
        Self {
            logical_from,
            logical_to,
            user_initiated: true,
        }
    }

    pub fn programmatic(logical_from: f64, logical_to: f64) -> Self {
        Self {
            logical_from,
            logical_to,
            user_initiated: false,
        }
    }

    pub(crate) fn shifted(self, by: f64) -> Self {
        Self {
            logical_from: self.logical_from + by,
            logical_to: self.logical_to + by,
            ..self
        }
    }
}

/// Whether the data provider is currently usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Availability {
    Available,
    /// Provider is throttling; fetches resume after the cooldown
    RateLimited { retry_in: Duration },
}

/// Overlay series, present only when enabled and computable
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorOverlays {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma5: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma20: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma50: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma200: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema20: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger_upper: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger_lower: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trendline: Option<TrendLine>,
}

/// Everything the render layer needs after a state change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    pub symbol: String,
    pub candles: Vec<Candle>,
    pub indicator_overlays: IndicatorOverlays,
    pub active_interval: Interval,
    pub range: RangeSelection,
    pub interval_validity: Vec<(Interval, bool)>,
    pub availability: Availability,
    pub reached_historical_limit: bool,
    /// Percent change across the visible candles while in a custom range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_change: Option<f64>,
}

impl RenderSnapshot {
    pub fn is_interval_valid(&self, interval: Interval) -> bool {
        self.interval_validity
            .iter()
            .any(|&(candidate, valid)| candidate == interval && valid)
    }
}
