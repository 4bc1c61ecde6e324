//! Registry of open charts
//!
//! Each chart gets its own controller and window, addressed by a
//! [`ChartId`]. Nothing is shared between charts except configuration and
//! the clock.

use crate::clock::Clock;
use crate::controller::ChartController;
use crate::effects::Effect;
use candle_charts_config::ChartConfig;
use candle_charts_shared::{ChartsError, DisplayRange};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartId(Uuid);

impl ChartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub struct ChartRegistry {
    config: ChartConfig,
    clock: Arc<dyn Clock>,
    charts: HashMap<ChartId, ChartController>,
}

impl ChartRegistry {
    pub fn new(config: ChartConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            charts: HashMap::new(),
        }
    }

    /// Creates a chart and starts its initial load
    pub fn open_chart(&mut self, symbol: impl Into<String>, range: DisplayRange) -> (ChartId, Vec<Effect>) {
        let id = ChartId::new();
        let mut controller = ChartController::new(self.config.clone(), Arc::clone(&self.clock));
        let effects = controller.open(symbol, range);
        self.charts.insert(id, controller);
        log::debug!("Registered chart {} ({} open)", id, self.charts.len());
        (id, effects)
    }

    pub fn with_chart<F, R>(&self, id: ChartId, f: F) -> Result<R, ChartsError>
    where
        F: FnOnce(&ChartController) -> R,
    {
        self.charts.get(&id).map(f).ok_or_else(|| not_found(id))
    }

    pub fn with_chart_mut<F, R>(&mut self, id: ChartId, f: F) -> Result<R, ChartsError>
    where
        F: FnOnce(&mut ChartController) -> R,
    {
        self.charts.get_mut(&id).map(f).ok_or_else(|| not_found(id))
    }

    /// Closes and removes a chart
    pub fn close_chart(&mut self, id: ChartId) -> Result<(), ChartsError> {
        let mut controller = self.charts.remove(&id).ok_or_else(|| not_found(id))?;
        controller.close();
        Ok(())
    }

    pub fn contains(&self, id: ChartId) -> bool {
        self.charts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.charts.keys().copied()
    }
}

fn not_found(id: ChartId) -> ChartsError {
    ChartsError::ChartNotFound { id: id.to_string() }
}
