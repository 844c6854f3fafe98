use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::experiment::arm::{ArmState, ExperimentArm};
use crate::types::window::TimeWindow;

/// Exploit order over selectable arms:
/// arms with data (Active/Winner) before Candidates, then mean reward desc,
/// then reward variance asc, then creation order.
pub(crate) fn exploit_order(a: &ExperimentArm, b: &ExperimentArm) -> Ordering {
    let rank = |arm: &ExperimentArm| u8::from(!arm.is_proven_state());
    rank(a)
        .cmp(&rank(b))
        .then_with(|| {
            let ma = a.mean_reward().unwrap_or(f64::NEG_INFINITY);
            let mb = b.mean_reward().unwrap_or(f64::NEG_INFINITY);
            mb.total_cmp(&ma)
        })
        .then_with(|| {
            let va = a.reward_variance().unwrap_or(f64::INFINITY);
            let vb = b.reward_variance().unwrap_or(f64::INFINITY);
            va.total_cmp(&vb)
        })
        .then_with(|| a.seq.cmp(&b.seq))
}

/// A selectable arm as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub window: TimeWindow,
    pub state: ArmState,
    pub trials: u64,
    pub mean_reward: Option<f64>,
}

/// Immutable snapshot of the live window set, in exploit order, with the
/// exploration rate to apply.
///
/// Handed to the scheduler by value; nothing in it points back at the
/// manager's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowPool {
    epsilon: f64,
    entries: Vec<PoolEntry>,
}

impl WindowPool {
    pub(crate) fn from_arms<'a>(epsilon: f64, arms: impl Iterator<Item = &'a ExperimentArm>) -> Self {
        let mut live: Vec<&ExperimentArm> = arms.filter(|a| a.is_selectable()).collect();
        live.sort_by(|a, b| exploit_order(a, b));
        let entries = live
            .into_iter()
            .map(|arm| PoolEntry {
                window: arm.window,
                state: arm.state,
                trials: arm.trials,
                mean_reward: arm.mean_reward(),
            })
            .collect();
        Self { epsilon, entries }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, window: &TimeWindow) -> bool {
        self.entries.iter().any(|e| e.window == *window)
    }

    /// The exploit choice: best Active/Winner by mean, or the earliest
    /// Candidate while nothing has data.
    pub fn best(&self) -> Option<TimeWindow> {
        self.entries.first().map(|e| e.window)
    }

    /// Non-Winner arms eligible for exploration.
    pub fn exploration_set(&self) -> Vec<TimeWindow> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, ArmState::Active | ArmState::Candidate))
            .map(|e| e.window)
            .collect()
    }

    /// Epsilon-greedy choice. With probability `epsilon` a uniform pick from
    /// the exploration set, otherwise `best()`. An empty exploration set
    /// falls back to `best()`.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TimeWindow> {
        if self.entries.is_empty() {
            return None;
        }
        if self.epsilon > 0.0 && rng.random::<f64>() < self.epsilon {
            let explore = self.exploration_set();
            if !explore.is_empty() {
                return Some(explore[rng.random_range(0..explore.len())]);
            }
        }
        self.best()
    }

    /// Every window in exploit order; the scheduler's collision fallback.
    pub fn fallback_order(&self) -> impl Iterator<Item = TimeWindow> + '_ {
        self.entries.iter().map(|e| e.window)
    }
}
