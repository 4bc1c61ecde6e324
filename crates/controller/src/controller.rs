//! Chart data controller
//!
//! One controller per open chart. It owns the loaded [`ChartWindow`] and
//! turns user input and fetch results into [`Effect`]s; it never performs
//! I/O itself. A caller (see [`crate::session::ChartSession`]) executes the
//! effects and feeds the outcomes back in.

use crate::clock::Clock;
use crate::effects::{
    Availability, Effect, FetchPurpose, FetchTicket, RangeSelection, RenderSnapshot, Timer,
    TimerKind, ViewportChange,
};
use crate::overlays::compute_overlays;
use crate::resolution::{
    best_interval_for_visible_span, interval_validity, is_interval_valid_for_range,
    should_switch_interval,
};
use crate::window::ChartWindow;
use candle_charts_config::ChartConfig;
use candle_charts_data::{bucket_start, FetchRequest, FetchResult};
use candle_charts_indicators::percent_change;
use candle_charts_shared::{Candle, DisplayRange, FetchError, Interval, TimeRange};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartState {
    /// Nothing loaded yet, or the chart was closed
    Idle,
    Loaded,
    BackfillingHistory,
    SwitchingInterval,
}

#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    interval: Interval,
    restore: TimeRange,
}

pub struct ChartController {
    config: ChartConfig,
    clock: Arc<dyn Clock>,
    state: ChartState,
    generation: u64,
    next_ticket_id: u64,
    in_flight: Option<FetchTicket>,
    symbol: Option<String>,
    /// Range of an initial load that has not completed yet
    pending_range: Option<DisplayRange>,
    pending_switch: Option<PendingSwitch>,
    /// Oldest loaded time when the in-flight backfill was issued
    backfill_anchor: Option<i64>,
    window: Option<ChartWindow>,
    selection: Option<RangeSelection>,
    viewport: Option<ViewportChange>,
    interaction_armed: bool,
    backfill_cooling: bool,
    backfill_attempts: u32,
    rate_limit_attempts: u32,
    availability: Availability,
}

impl ChartController {
    pub fn new(config: ChartConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: ChartState::Idle,
            generation: 0,
            next_ticket_id: 0,
            in_flight: None,
            symbol: None,
            pending_range: None,
            pending_switch: None,
            backfill_anchor: None,
            window: None,
            selection: None,
            viewport: None,
            interaction_armed: false,
            backfill_cooling: false,
            backfill_attempts: 0,
            rate_limit_attempts: 0,
            availability: Availability::Available,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn window(&self) -> Option<&ChartWindow> {
        self.window.as_ref()
    }

    pub fn selection(&self) -> Option<RangeSelection> {
        self.selection
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn is_loading_more(&self) -> bool {
        self.state == ChartState::BackfillingHistory
    }

    pub fn is_fetching_new_interval(&self) -> bool {
        self.state == ChartState::SwitchingInterval
    }

    /// Interval on screen, or the one being loaded initially
    pub fn active_interval(&self) -> Option<Interval> {
        self.window
            .as_ref()
            .map(|window| window.interval)
            .or_else(|| self.pending_range.map(|range| range.interval()))
    }

    /// Loads `symbol` over a predefined range, discarding any previous chart
    pub fn open(&mut self, symbol: impl Into<String>, range: DisplayRange) -> Vec<Effect> {
        let symbol = symbol.into();
        self.reset();
        log::info!("Opening chart {} over {} at {}", symbol, range, range.interval());

        self.symbol = Some(symbol);
        self.selection = Some(RangeSelection::Preset(range));
        self.pending_range = Some(range);
        vec![self.initial_fetch(range)]
    }

    /// Range-selector click: reloads the current symbol over `range`
    pub fn select_range(&mut self, range: DisplayRange) -> Vec<Effect> {
        match self.symbol.clone() {
            Some(symbol) => self.open(symbol, range),
            None => Vec::new(),
        }
    }

    /// Drops all chart state. Late fetch results and timers are ignored.
    pub fn close(&mut self) {
        if let Some(symbol) = &self.symbol {
            log::info!("Closing chart {}", symbol);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.state = ChartState::Idle;
        self.in_flight = None;
        self.symbol = None;
        self.pending_range = None;
        self.pending_switch = None;
        self.backfill_anchor = None;
        self.window = None;
        self.selection = None;
        self.viewport = None;
        self.interaction_armed = false;
        self.backfill_cooling = false;
        self.backfill_attempts = 0;
        self.rate_limit_attempts = 0;
        self.availability = Availability::Available;
    }

    fn issue_ticket(&mut self, purpose: FetchPurpose) -> FetchTicket {
        self.next_ticket_id += 1;
        let ticket = FetchTicket {
            id: self.next_ticket_id,
            generation: self.generation,
            purpose,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    fn timer(&self, kind: TimerKind, after: Duration) -> Effect {
        Effect::Schedule {
            timer: Timer {
                kind,
                generation: self.generation,
            },
            after,
        }
    }

    fn initial_fetch(&mut self, range: DisplayRange) -> Effect {
        let ticket = self.issue_ticket(FetchPurpose::Initial);
        Effect::FetchRange {
            ticket,
            symbol: self.symbol.clone().unwrap_or_default(),
            range,
        }
    }

    fn render(&self) -> Option<Effect> {
        self.snapshot().map(|snapshot| Effect::Render(Box::new(snapshot)))
    }

    /// Viewport report from the render layer
    pub fn on_viewport_changed(&mut self, change: ViewportChange) -> Vec<Effect> {
        self.viewport = Some(change);
        if self.window.is_none() {
            return Vec::new();
        }
        if !self.interaction_armed {
            log::debug!("Viewport change ignored during post-render debounce");
            return Vec::new();
        }

        let mut effects = Vec::new();
        if change.user_initiated {
            let became_custom = self.selection != Some(RangeSelection::Custom);
            if let Some(window) = self.window.as_mut() {
                if let Some(visible) = window.visible_time_range(change.logical_from, change.logical_to) {
                    window.intended = visible;
                }
            }
            self.selection = Some(RangeSelection::Custom);
            self.backfill_attempts = 0;
            if became_custom {
                effects.extend(self.render());
            }

            // only zooming switches interval; a restored range must not
            if let Some(switch) = self.implicit_switch() {
                effects.extend(switch);
                return effects;
            }
        }
        effects.extend(self.try_backfill());
        effects
    }

    /// Explicit interval selection over the intended range.
    ///
    /// Refused when the interval is unavailable for that range, and dropped
    /// while another fetch is in flight.
    pub fn request_interval(&mut self, interval: Interval) -> Vec<Effect> {
        let Some(window) = self.window.as_ref() else {
            return Vec::new();
        };
        if window.interval == interval {
            return Vec::new();
        }
        let intended = window.intended;

        if !is_interval_valid_for_range(
            interval,
            intended,
            self.clock.now(),
            self.config.loading.intraday_limit_days,
        ) {
            log::debug!("Interval {} is not available for the intended range", interval);
            return Vec::new();
        }
        if !self.can_fetch() {
            log::debug!("Interval switch to {} dropped, {:?} in progress", interval, self.state);
            return Vec::new();
        }
        self.begin_switch(interval, intended, intended)
    }

    fn can_fetch(&self) -> bool {
        self.state == ChartState::Loaded && self.availability == Availability::Available
    }

    /// Switch warranted by the current zoom level, if any.
    ///
    /// `Some` means a switch was wanted, even if it had to be dropped; the
    /// caller then skips the backfill check.
    fn implicit_switch(&mut self) -> Option<Vec<Effect>> {
        if !self.config.loading.auto_interval_switch {
            return None;
        }
        let viewport = self.viewport?;
        let window = self.window.as_ref()?;
        let visible = window.visible_time_range(viewport.logical_from, viewport.logical_to)?;
        let current = window.interval;
        let best = best_interval_for_visible_span(visible.duration());

        if !should_switch_interval(current, best, visible.duration(), &self.config.hysteresis) {
            return None;
        }
        if !is_interval_valid_for_range(
            best,
            visible,
            self.clock.now(),
            self.config.loading.intraday_limit_days,
        ) {
            log::debug!("Skipping switch to {}: not available for the visible range", best);
            return None;
        }
        if !self.can_fetch() {
            log::debug!("Interval switch to {} dropped, {:?} in progress", best, self.state);
            return Some(Vec::new());
        }
        Some(self.begin_switch(best, visible, visible))
    }

    fn begin_switch(&mut self, interval: Interval, around: TimeRange, restore: TimeRange) -> Vec<Effect> {
        let Some(window) = self.window.as_ref() else {
            return Vec::new();
        };
        let loading = &self.config.loading;
        let span = around.duration().max(0);
        let padding = (span as f64 * loading.fetch_padding_multiplier).round() as i64;
        let step = interval.seconds();
        let min_span = step * loading.min_candles_fetch as i64;

        let now = self.clock.now();
        let period2 = around.end.saturating_add(padding).min(now);
        let period1 = around
            .start
            .saturating_sub(padding)
            .min(period2.saturating_sub(min_span))
            .max(0);
        // whole buckets only, or a derived interval gets partial edge candles
        let period1 = bucket_start(period1, step);
        let period2 = bucket_start(period2, step).saturating_add(step - 1).min(now);
        let request = FetchRequest::new(window.symbol.clone(), period1, period2, interval);

        log::info!(
            "Switching {} from {} to {} over [{}, {}]",
            window.symbol,
            window.interval,
            interval,
            period1,
            period2
        );
        self.state = ChartState::SwitchingInterval;
        self.pending_switch = Some(PendingSwitch { interval, restore });
        let ticket = self.issue_ticket(FetchPurpose::IntervalSwitch);
        vec![Effect::FetchWindow { ticket, request }]
    }

    fn try_backfill(&mut self) -> Vec<Effect> {
        let Some(viewport) = self.viewport else {
            return Vec::new();
        };
        let loading = &self.config.loading;
        if viewport.logical_from >= loading.load_more_threshold as f64 {
            return Vec::new();
        }
        let Some(window) = self.window.as_ref() else {
            return Vec::new();
        };
        if window.reached_historical_limit {
            return Vec::new();
        }
        if !self.can_fetch() || self.backfill_cooling {
            log::debug!(
                "Backfill skipped: state {:?}, cooling {}, {:?}",
                self.state,
                self.backfill_cooling,
                self.availability
            );
            return Vec::new();
        }
        if self.backfill_attempts >= loading.max_backfill_attempts {
            log::debug!("Backfill attempt budget of {} spent", loading.max_backfill_attempts);
            return Vec::new();
        }
        let Some(loaded) = window.loaded_range() else {
            return Vec::new();
        };

        let span = if loaded.duration() > 0 {
            loaded.duration()
        } else {
            window.interval.seconds() * loading.min_candles_fetch as i64
        };
        let period2 = loaded.start;
        let period1 = bucket_start(
            loaded.start.saturating_sub(span).max(0),
            window.interval.seconds(),
        );
        if period1 >= period2 {
            log::info!("{} has no history before {}", window.symbol, loaded.start);
            if let Some(window) = self.window.as_mut() {
                window.reached_historical_limit = true;
            }
            return self.render().into_iter().collect();
        }

        let request = FetchRequest::new(window.symbol.clone(), period1, period2, window.interval);
        log::debug!("Backfilling {} [{}, {}] at {}", window.symbol, period1, period2, window.interval);
        self.backfill_attempts += 1;
        self.backfill_anchor = Some(loaded.start);
        self.state = ChartState::BackfillingHistory;
        let ticket = self.issue_ticket(FetchPurpose::Backfill);
        vec![Effect::FetchWindow { ticket, request }]
    }

    /// Applies a fetch outcome. Results for any ticket other than the one in
    /// flight are ignored.
    pub fn on_fetch_complete(&mut self, ticket: FetchTicket, result: FetchResult<Vec<Candle>>) -> Vec<Effect> {
        if self.in_flight != Some(ticket) {
            log::debug!("Ignoring stale {:?} response (ticket {})", ticket.purpose, ticket.id);
            return Vec::new();
        }
        self.in_flight = None;

        let candles = match result {
            Err(FetchError::RateLimited { retry_after }) => {
                return self.on_rate_limited(ticket.purpose, retry_after);
            }
            other => other,
        };
        if candles.as_ref().is_ok_and(|candles| !candles.is_empty()) {
            self.rate_limit_attempts = 0;
        }

        match ticket.purpose {
            FetchPurpose::Initial => self.finish_initial(candles),
            FetchPurpose::Backfill => self.finish_backfill(candles),
            FetchPurpose::IntervalSwitch => self.finish_switch(candles),
        }
    }

    fn finish_initial(&mut self, result: FetchResult<Vec<Candle>>) -> Vec<Effect> {
        let Some(range) = self.pending_range else {
            return Vec::new();
        };
        let symbol = self.symbol.clone().unwrap_or_default();

        let candles = match result {
            Ok(candles) if !candles.is_empty() => candles,
            Ok(_) => {
                log::warn!("No candles for {} over {}", symbol, range);
                return self.render().into_iter().collect();
            }
            Err(e) => {
                log::warn!("Loading {} over {} failed: {}", symbol, range, e);
                return self.render().into_iter().collect();
            }
        };

        let (start, end) = range.window(self.clock.now());
        let window = ChartWindow::new(symbol, range.interval(), candles, TimeRange::new(start, end));
        log::info!("Loaded {} {} candles for {}", window.len(), window.interval, window.symbol);
        self.pending_range = None;
        self.window = Some(window);
        self.state = ChartState::Loaded;
        self.interaction_armed = false;

        let mut effects: Vec<Effect> = self.render().into_iter().collect();
        effects.push(self.timer(TimerKind::InteractionArmed, self.config.loading.debounce()));
        effects
    }

    fn finish_backfill(&mut self, result: FetchResult<Vec<Candle>>) -> Vec<Effect> {
        self.state = ChartState::Loaded;
        let anchor = self.backfill_anchor.take();
        let Some(window) = self.window.as_mut() else {
            return Vec::new();
        };

        let added = match result {
            Ok(candles) => window.merge_history(candles),
            Err(e) => {
                log::debug!("Backfill for {} failed, treating as exhausted: {}", window.symbol, e);
                0
            }
        };

        if added == 0 {
            log::info!("Reached historical limit for {} at {}", window.symbol, window.interval);
            window.reached_historical_limit = true;
            return self.render().into_iter().collect();
        }

        log::info!("Backfill merged {} candles into {}", added, window.symbol);
        if let Some(anchor) = anchor {
            let shift = window.count_before(anchor) as f64;
            self.viewport = self.viewport.map(|viewport| viewport.shifted(shift));
        }

        self.backfill_cooling = true;
        let mut effects: Vec<Effect> = self.render().into_iter().collect();
        effects.push(self.timer(TimerKind::BackfillRecheck, self.config.loading.throttle()));
        effects
    }

    fn finish_switch(&mut self, result: FetchResult<Vec<Candle>>) -> Vec<Effect> {
        self.state = ChartState::Loaded;
        let Some(pending) = self.pending_switch.take() else {
            return Vec::new();
        };
        let Some(previous) = self.window.as_ref() else {
            return Vec::new();
        };

        let candles = match result {
            Ok(candles) if !candles.is_empty() => candles,
            Ok(_) => {
                log::warn!(
                    "Interval switch to {} returned no candles, keeping {}",
                    pending.interval,
                    previous.interval
                );
                return Vec::new();
            }
            Err(e) => {
                log::warn!(
                    "Interval switch to {} failed, keeping {}: {}",
                    pending.interval,
                    previous.interval,
                    e
                );
                return Vec::new();
            }
        };

        let window = ChartWindow::new(previous.symbol.clone(), pending.interval, candles, previous.intended);
        log::info!(
            "Switched {} to {} with {} candles",
            window.symbol,
            window.interval,
            window.len()
        );
        self.window = Some(window);
        self.viewport = None;
        self.backfill_attempts = 0;

        let mut effects: Vec<Effect> = self.render().into_iter().collect();
        effects.push(Effect::RestoreVisibleRange(pending.restore));
        effects
    }

    fn on_rate_limited(&mut self, purpose: FetchPurpose, retry_after: Option<Duration>) -> Vec<Effect> {
        self.rate_limit_attempts += 1;
        let backoff = self.config.loading.rate_limit_backoff(self.rate_limit_attempts);
        let wait = retry_after.map_or(backoff, |hint| hint.max(backoff));
        log::warn!(
            "Provider rate limited the {:?} fetch, backing off for {:?} (attempt {})",
            purpose,
            wait,
            self.rate_limit_attempts
        );

        match purpose {
            // the pending range stays so the load is retried after the cooldown
            FetchPurpose::Initial => {}
            FetchPurpose::Backfill => {
                self.state = ChartState::Loaded;
                self.backfill_anchor = None;
            }
            FetchPurpose::IntervalSwitch => {
                self.state = ChartState::Loaded;
                self.pending_switch = None;
            }
        }
        self.availability = Availability::RateLimited { retry_in: wait };

        let mut effects: Vec<Effect> = self.render().into_iter().collect();
        effects.push(self.timer(TimerKind::RateLimitCooldown, wait));
        effects
    }

    /// Timer expiry. Timers from an earlier generation are ignored.
    pub fn on_timer(&mut self, timer: Timer) -> Vec<Effect> {
        if timer.generation != self.generation {
            log::debug!("Ignoring stale {:?} timer", timer.kind);
            return Vec::new();
        }

        match timer.kind {
            TimerKind::InteractionArmed => {
                self.interaction_armed = true;
                Vec::new()
            }
            TimerKind::BackfillRecheck => {
                self.backfill_cooling = false;
                if self.interaction_armed {
                    self.try_backfill()
                } else {
                    Vec::new()
                }
            }
            TimerKind::RateLimitCooldown => {
                self.availability = Availability::Available;
                let mut effects: Vec<Effect> = Vec::new();
                if self.window.is_none() {
                    if let Some(range) = self.pending_range {
                        log::info!("Retrying initial load over {}", range);
                        effects.push(self.initial_fetch(range));
                        return effects;
                    }
                }
                effects.extend(self.render());
                if self.interaction_armed {
                    effects.extend(self.try_backfill());
                }
                effects
            }
        }
    }

    /// Current render state, or `None` when no chart is open
    pub fn snapshot(&self) -> Option<RenderSnapshot> {
        let symbol = self.symbol.clone()?;
        let active_interval = self.active_interval()?;
        let now = self.clock.now();
        let limit_days = self.config.loading.intraday_limit_days;

        let intended = match (&self.window, self.pending_range) {
            (Some(window), _) => window.intended,
            (None, Some(range)) => {
                let (start, end) = range.window(now);
                TimeRange::new(start, end)
            }
            (None, None) => TimeRange::new(now, now),
        };
        let candles = self
            .window
            .as_ref()
            .map(|window| window.candles().to_vec())
            .unwrap_or_default();

        Some(RenderSnapshot {
            symbol,
            indicator_overlays: compute_overlays(&candles, active_interval, &self.config.indicators),
            candles,
            active_interval,
            range: self.selection.unwrap_or(RangeSelection::Custom),
            interval_validity: interval_validity(intended, now, limit_days),
            availability: self.availability,
            reached_historical_limit: self
                .window
                .as_ref()
                .is_some_and(|window| window.reached_historical_limit),
            visible_change: self.visible_change(),
        })
    }

    /// Percent change from the first to the last visible close in custom mode
    fn visible_change(&self) -> Option<f64> {
        if self.selection != Some(RangeSelection::Custom) {
            return None;
        }
        let viewport = self.viewport?;
        let visible = self
            .window
            .as_ref()?
            .visible_candles(viewport.logical_from, viewport.logical_to);
        if visible.len() < 2 {
            return None;
        }
        percent_change(visible, visible.len() - 1)
    }
}
