//! Async driver for a [`ChartController`]
//!
//! The session executes the controller's effects: fetches go to a
//! [`CandleFetcher`], timers to a [`Scheduler`], and snapshots to a
//! [`RenderSink`]. Completions are fed back one at a time, so the
//! controller is only ever touched from the task polling the session.

use crate::controller::ChartController;
use crate::effects::{Effect, FetchTicket, RenderSnapshot, Timer, ViewportChange};
use candle_charts_data::{fetch_window, CandleFetcher, FetchResult};
use candle_charts_shared::{Candle, DisplayRange, Interval, TimeRange};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Receives render updates
pub trait RenderSink: Send {
    fn render(&mut self, snapshot: &RenderSnapshot);

    fn restore_visible_range(&mut self, range: TimeRange);
}

/// Timer source for debounce, throttle and backoff delays
pub trait Scheduler: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Fires every timer at once
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(futures::future::ready(()))
    }
}

enum SessionEvent {
    Fetched(FetchTicket, FetchResult<Vec<Candle>>),
    Elapsed(Timer),
}

pub struct ChartSession<S> {
    controller: ChartController,
    fetcher: Arc<dyn CandleFetcher>,
    scheduler: Arc<dyn Scheduler>,
    sink: S,
    fetches: FuturesUnordered<BoxFuture<'static, (FetchTicket, FetchResult<Vec<Candle>>)>>,
    timers: FuturesUnordered<BoxFuture<'static, Timer>>,
}

impl<S: RenderSink> ChartSession<S> {
    pub fn new(controller: ChartController, fetcher: Arc<dyn CandleFetcher>, sink: S) -> Self {
        Self::with_scheduler(controller, fetcher, Arc::new(TokioScheduler), sink)
    }

    pub fn with_scheduler(
        controller: ChartController,
        fetcher: Arc<dyn CandleFetcher>,
        scheduler: Arc<dyn Scheduler>,
        sink: S,
    ) -> Self {
        Self {
            controller,
            fetcher,
            scheduler,
            sink,
            fetches: FuturesUnordered::new(),
            timers: FuturesUnordered::new(),
        }
    }

    pub fn controller(&self) -> &ChartController {
        &self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Fetches and timers not yet fed back
    pub fn pending(&self) -> usize {
        self.fetches.len() + self.timers.len()
    }

    pub fn open(&mut self, symbol: impl Into<String>, range: DisplayRange) {
        let effects = self.controller.open(symbol, range);
        self.apply(effects);
    }

    pub fn select_range(&mut self, range: DisplayRange) {
        let effects = self.controller.select_range(range);
        self.apply(effects);
    }

    pub fn viewport_changed(&mut self, change: ViewportChange) {
        let effects = self.controller.on_viewport_changed(change);
        self.apply(effects);
    }

    pub fn request_interval(&mut self, interval: Interval) {
        let effects = self.controller.request_interval(interval);
        self.apply(effects);
    }

    /// Closes the chart and abandons outstanding work
    pub fn close(&mut self) {
        self.controller.close();
        self.fetches = FuturesUnordered::new();
        self.timers = FuturesUnordered::new();
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchRange { ticket, symbol, range } => {
                    let fetcher = Arc::clone(&self.fetcher);
                    self.fetches.push(Box::pin(async move {
                        let result = fetcher.fetch_candles_by_range(&symbol, range).await;
                        (ticket, result)
                    }));
                }
                Effect::FetchWindow { ticket, request } => {
                    let fetcher = Arc::clone(&self.fetcher);
                    self.fetches.push(Box::pin(async move {
                        let result = fetch_window(fetcher.as_ref(), &request).await;
                        (ticket, result)
                    }));
                }
                Effect::Schedule { timer, after } => {
                    let sleep = self.scheduler.sleep(after);
                    self.timers.push(Box::pin(async move {
                        sleep.await;
                        timer
                    }));
                }
                Effect::Render(snapshot) => self.sink.render(&snapshot),
                Effect::RestoreVisibleRange(range) => self.sink.restore_visible_range(range),
            }
        }
    }

    /// Waits for the next fetch or timer and feeds it to the controller.
    ///
    /// Returns `false` once nothing is outstanding.
    pub async fn step(&mut self) -> bool {
        let event = tokio::select! {
            biased;
            Some((ticket, result)) = self.fetches.next() => SessionEvent::Fetched(ticket, result),
            Some(timer) = self.timers.next() => SessionEvent::Elapsed(timer),
            else => return false,
        };

        let effects = match event {
            SessionEvent::Fetched(ticket, result) => self.controller.on_fetch_complete(ticket, result),
            SessionEvent::Elapsed(timer) => self.controller.on_timer(timer),
        };
        self.apply(effects);
        true
    }

    /// Drives the session until no fetch or timer is outstanding
    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }
}
