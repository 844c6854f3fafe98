use serde::{Deserialize, Serialize};

use crate::metrics::RewardTotals;
use crate::types::window::TimeWindow;

/// Lifecycle of an arm.
///
/// ```text
/// Candidate ──(first trial)──▶ Active ──▶ Winner
///     │                          │          │
///     └──────────(prune)─────────┴──────────┴──▶ Pruned
/// ```
///
/// A Winner that is overtaken by a better proven arm drops back to Active.
/// Pruned is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmState {
    Candidate,
    Active,
    Winner,
    Pruned,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArmOrigin {
    Baseline,
    Perturbation { parent: TimeWindow, offset_hours: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PruneReason {
    Underperforming { mean_reward: f64, best_mean_reward: f64 },
    Idle { idle_cycles: u64 },
}

/// One time window under experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentArm {
    pub window: TimeWindow,
    /// Creation order within the store; the last tie-breaker.
    pub seq: u64,
    pub origin: ArmOrigin,
    pub state: ArmState,
    pub trials: u64,
    pub reward_sum: f64,
    pub reward_sq_sum: f64,
    pub created_cycle: u64,
    /// Most recent cycle in which the trial count grew (creation cycle until then).
    pub last_trial_cycle: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pruned: Option<PruneReason>,
}

impl ExperimentArm {
    pub fn candidate(window: TimeWindow, seq: u64, origin: ArmOrigin, cycle: u64) -> Self {
        Self {
            window,
            seq,
            origin,
            state: ArmState::Candidate,
            trials: 0,
            reward_sum: 0.0,
            reward_sq_sum: 0.0,
            created_cycle: cycle,
            last_trial_cycle: cycle,
            pruned: None,
        }
    }

    pub fn mean_reward(&self) -> Option<f64> {
        self.totals().stats().mean_reward
    }

    pub fn reward_variance(&self) -> Option<f64> {
        self.totals().stats().reward_variance
    }

    pub fn is_selectable(&self) -> bool {
        self.state != ArmState::Pruned
    }

    /// Active or Winner: has data and competes on mean reward.
    pub fn is_proven_state(&self) -> bool {
        matches!(self.state, ArmState::Active | ArmState::Winner)
    }

    pub(crate) fn totals(&self) -> RewardTotals {
        RewardTotals {
            trials: self.trials,
            reward_sum: self.reward_sum,
            reward_sq_sum: self.reward_sq_sum,
        }
    }

    /// Overwrite counters from the cycle's snapshot. Returns whether the
    /// trial count grew.
    pub(crate) fn sync(&mut self, totals: RewardTotals, cycle: u64) -> bool {
        let grew = totals.trials > self.trials;
        self.trials = totals.trials;
        self.reward_sum = totals.reward_sum;
        self.reward_sq_sum = totals.reward_sq_sum;
        if grew {
            self.last_trial_cycle = cycle;
        }
        grew
    }

    pub(crate) fn prune(&mut self, reason: PruneReason) {
        self.state = ArmState::Pruned;
        self.pruned = Some(reason);
    }
}
