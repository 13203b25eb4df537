//! Engine tuning parameters.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::Seconds;

/// Coefficients for sizing a search window from the expected travel time.
///
/// `window = min_window + min_transit_time_coefficient * travel_time`,
/// rounded up to `step` and clamped to `[min_window, max_window]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicSearchWindow {
    pub min_transit_time_coefficient: f64,
    pub min_window_mins: i64,
    pub max_window_mins: i64,
    pub step_mins: i64,
}

impl Default for DynamicSearchWindow {
    fn default() -> Self {
        Self {
            min_transit_time_coefficient: 0.5,
            min_window_mins: 40,
            max_window_mins: 180, // 3 hours
            step_mins: 10,
        }
    }
}

impl DynamicSearchWindow {
    pub fn min_window(&self) -> Duration {
        Duration::minutes(self.min_window_mins)
    }

    pub fn max_window(&self) -> Duration {
        Duration::minutes(self.max_window_mins)
    }

    /// Window in seconds for a trip expected to take `min_travel_time`.
    pub fn window_for(&self, min_travel_time: Seconds) -> Seconds {
        let min = (self.min_window_mins * 60) as f64;
        let max = (self.max_window_mins * 60) as Seconds;
        let step = (self.step_mins * 60).max(1) as f64;

        let raw = min + self.min_transit_time_coefficient * f64::from(min_travel_time.max(0));
        let rounded = (raw / step).ceil() * step;
        (rounded as Seconds).clamp(min as Seconds, max.max(min as Seconds))
    }
}

/// Process-wide engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaptorTuning {
    pub max_transfers: usize,
    /// Distance between range iterations, in seconds.
    pub iteration_step_secs: Seconds,
    pub dynamic_search_window: DynamicSearchWindow,
}

impl Default for RaptorTuning {
    fn default() -> Self {
        Self {
            max_transfers: 12,
            iteration_step_secs: 60,
            dynamic_search_window: DynamicSearchWindow::default(),
        }
    }
}
