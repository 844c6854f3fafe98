use serde::{Deserialize, Serialize};

use crate::experiment::arm::{ArmOrigin, ExperimentArm};
use crate::types::window::TimeWindow;

/// Arm history across planning cycles.
///
/// Passed explicitly to the manager so each experiment (and each test) owns
/// its own state. Serializable, so a host can persist it between runs;
/// pruned arms stay here for audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStore {
    cycle: u64,
    next_seq: u64,
    arms: Vec<ExperimentArm>,
}

impl ArmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed planning cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn arms(&self) -> &[ExperimentArm] {
        &self.arms
    }

    /// The arm for `window`, pruned or not. Each window has at most one arm.
    pub fn arm(&self, window: &TimeWindow) -> Option<&ExperimentArm> {
        self.arms.iter().find(|a| a.window == *window)
    }

    pub fn contains(&self, window: &TimeWindow) -> bool {
        self.arm(window).is_some()
    }

    pub fn selectable(&self) -> impl Iterator<Item = &ExperimentArm> {
        self.arms.iter().filter(|a| a.is_selectable())
    }

    /// Add a Candidate for `window` unless the window already has an arm.
    pub(crate) fn propose(&mut self, window: TimeWindow, origin: ArmOrigin) -> bool {
        if self.contains(&window) {
            return false;
        }
        let arm = ExperimentArm::candidate(window, self.next_seq, origin, self.cycle);
        self.next_seq += 1;
        self.arms.push(arm);
        true
    }

    pub(crate) fn advance_cycle(&mut self) -> u64 {
        self.cycle += 1;
        self.cycle
    }

    pub(crate) fn arms_mut(&mut self) -> &mut [ExperimentArm] {
        &mut self.arms
    }
}
