//! Chart data controller for candle charts
//!
//! Resolves sampling intervals, owns each open chart's candle window, and
//! decides when to backfill history or switch interval. The controller is a
//! synchronous state machine that emits effects; [`ChartSession`] runs those
//! effects against a fetcher and a render sink.

pub mod clock;
pub mod controller;
pub mod effects;
pub mod overlays;
pub mod registry;
pub mod resolution;
pub mod session;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ChartController, ChartState};
pub use effects::{
    Availability, Effect, FetchPurpose, FetchTicket, IndicatorOverlays, RangeSelection,
    RenderSnapshot, Timer, TimerKind, ViewportChange,
};
pub use overlays::{adjusted_period, compute_overlays, mas_enabled};
pub use registry::{ChartId, ChartRegistry};
pub use resolution::{
    best_interval_for_visible_span, interval_for_display_range, interval_validity,
    is_interval_valid_for_range, is_intraday_interval, should_switch_interval,
    should_switch_interval_keys,
};
pub use session::{ChartSession, ImmediateScheduler, RenderSink, Scheduler, TokioScheduler};
pub use window::ChartWindow;
