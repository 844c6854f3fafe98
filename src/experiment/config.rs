use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::types::window::TimeWindow;

// Key point:
// Serializable
// Comparable
// Explicit defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Windows every experiment starts from.
    #[serde(rename = "windows")]
    pub baseline_windows: Vec<TimeWindow>,
    /// Siblings are proposed at ±1..=spread hours on the baseline's day.
    pub experiment_spread_hours: u32,
    /// Perturbed siblings outside [earliest_hour, latest_hour] are not proposed.
    pub earliest_hour: u32,
    pub latest_hour: u32,
    pub min_trials_for_winner: u64,
    /// Arms past the minimum trial count whose mean falls below
    /// `prune_fraction * best_mean` are pruned.
    pub prune_fraction: f64,
    /// Exploration probability for epsilon-greedy selection.
    pub epsilon: f64,
    /// Planning cycles without a new trial before an arm is pruned.
    pub max_idle_cycles: u32,
}

impl ExperimentConfig {
    pub fn v0() -> Self {
        Self {
            baseline_windows: vec![window(Weekday::Tue, 10), window(Weekday::Thu, 11)],
            experiment_spread_hours: 2,
            earliest_hour: 6,
            latest_hour: 22,
            min_trials_for_winner: 3,
            prune_fraction: 0.5,
            epsilon: 0.1,
            max_idle_cycles: 4,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::v0()
    }
}

fn window(day: Weekday, hour: u32) -> TimeWindow {
    TimeWindow::saturating(day, hour)
}
