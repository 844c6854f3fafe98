use chrono::Weekday;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::experiment::arm::{ArmOrigin, ArmState, PruneReason};
use crate::experiment::config::ExperimentConfig;
use crate::experiment::policy::{exploit_order, WindowPool};
use crate::experiment::store::ArmStore;
use crate::metrics::WindowStatsSnapshot;
use crate::types::window::TimeWindow;

/// One state change applied during a planning cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub window: TimeWindow,
    pub from: ArmState,
    pub to: ArmState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub transitions: Vec<Transition>,
    pub winner: Option<TimeWindow>,
    pub selectable_arms: usize,
}

/// Runs the explore/exploit experiment over posting windows.
///
/// Holds only configuration; every call takes the arm history explicitly.
#[derive(Debug, Clone)]
pub struct WindowExperimentManager {
    config: ExperimentConfig,
}

impl WindowExperimentManager {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// The full proposal: baselines first, in configured order, then each
    /// baseline's siblings at -1, +1, -2, +2 ... hours. Duplicates and
    /// siblings outside the permitted hours are dropped.
    pub fn proposals(&self) -> Vec<(TimeWindow, ArmOrigin)> {
        let mut out: Vec<(TimeWindow, ArmOrigin)> = Vec::new();
        let mut push = |window: TimeWindow, origin: ArmOrigin| {
            if !out.iter().any(|(w, _)| *w == window) {
                out.push((window, origin));
            }
        };

        for base in &self.config.baseline_windows {
            push(*base, ArmOrigin::Baseline);
        }

        let spread = self.config.experiment_spread_hours as i32;
        for base in &self.config.baseline_windows {
            for distance in 1..=spread {
                for offset in [-distance, distance] {
                    let Some(sibling) = base.shifted(offset) else {
                        continue;
                    };
                    if !self.within_hours(&sibling) {
                        continue;
                    }
                    push(
                        sibling,
                        ArmOrigin::Perturbation {
                            parent: *base,
                            offset_hours: offset,
                        },
                    );
                }
            }
        }
        out
    }

    /// Add Candidates for every proposal whose window has no arm yet.
    /// Returns the newly proposed windows.
    pub fn seed(&self, store: &mut ArmStore) -> Vec<TimeWindow> {
        let added: Vec<TimeWindow> = self
            .proposals()
            .into_iter()
            .filter_map(|(window, origin)| store.propose(window, origin).then_some(window))
            .collect();
        if !added.is_empty() {
            info!(count = added.len(), cycle = store.cycle(), "seeded candidate windows");
        }
        added
    }

    /// Apply one planning cycle against a single stats snapshot.
    ///
    /// Order within the cycle: sync counters, promote Candidates with data,
    /// prune underperformers, prune idle arms, settle the Winner.
    pub fn run_cycle(&self, store: &mut ArmStore, stats: &WindowStatsSnapshot) -> CycleReport {
        let cycle = store.advance_cycle();
        let mut transitions = Vec::new();
        let cfg = &self.config;

        // 1. Sync counters and activate
        for arm in store.arms_mut().iter_mut().filter(|a| a.is_selectable()) {
            arm.sync(stats.totals(&arm.window), cycle);
            if arm.state == ArmState::Candidate && arm.trials > 0 {
                arm.state = ArmState::Active;
                transitions.push(Transition {
                    window: arm.window,
                    from: ArmState::Candidate,
                    to: ArmState::Active,
                });
            }
        }

        // 2. Underperformers, measured against the best mean among arms
        // with enough trials; a single lucky sample sets no reference
        let best_mean = store
            .arms()
            .iter()
            .filter(|a| a.is_proven_state() && a.trials >= cfg.min_trials_for_winner)
            .filter_map(|a| a.mean_reward())
            .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))));

        if let Some(best) = best_mean {
            let floor = cfg.prune_fraction * best;
            for arm in store.arms_mut().iter_mut() {
                if !arm.is_proven_state() || arm.trials < cfg.min_trials_for_winner {
                    continue;
                }
                let Some(mean) = arm.mean_reward() else {
                    continue;
                };
                if mean < floor {
                    transitions.push(Transition {
                        window: arm.window,
                        from: arm.state,
                        to: ArmState::Pruned,
                    });
                    arm.prune(PruneReason::Underperforming {
                        mean_reward: mean,
                        best_mean_reward: best,
                    });
                }
            }
        }

        // 3. Idle arms; a standing Winner is exempt
        if cfg.max_idle_cycles > 0 {
            let limit = u64::from(cfg.max_idle_cycles);
            for arm in store.arms_mut().iter_mut() {
                if !matches!(arm.state, ArmState::Candidate | ArmState::Active) {
                    continue;
                }
                let idle = cycle.saturating_sub(arm.last_trial_cycle);
                if idle >= limit {
                    transitions.push(Transition {
                        window: arm.window,
                        from: arm.state,
                        to: ArmState::Pruned,
                    });
                    arm.prune(PruneReason::Idle { idle_cycles: idle });
                }
            }
        }

        // 4. Winner: the leading proven arm, once it has enough trials.
        // An under-sampled leader does not unseat the standing Winner.
        let leader = store
            .arms()
            .iter()
            .filter(|a| a.is_proven_state())
            .min_by(|a, b| exploit_order(a, b))
            .filter(|a| a.trials >= cfg.min_trials_for_winner)
            .map(|a| a.window);

        if let Some(leader) = leader {
            for arm in store.arms_mut().iter_mut() {
                let next = if arm.window == leader {
                    ArmState::Winner
                } else if arm.state == ArmState::Winner {
                    ArmState::Active
                } else {
                    continue;
                };
                if arm.state != next {
                    transitions.push(Transition {
                        window: arm.window,
                        from: arm.state,
                        to: next,
                    });
                    arm.state = next;
                }
            }
        }

        for t in &transitions {
            info!(cycle, window = %t.window, from = ?t.from, to = ?t.to, "arm transition");
        }

        let winner = store
            .arms()
            .iter()
            .find(|a| a.state == ArmState::Winner)
            .map(|a| a.window);
        let selectable_arms = store.selectable().count();
        debug!(cycle, selectable_arms, winner = ?winner, "planning cycle complete");

        CycleReport {
            cycle,
            transitions,
            winner,
            selectable_arms,
        }
    }

    /// Immutable pool snapshot for the scheduler.
    pub fn pool(&self, store: &ArmStore) -> WindowPool {
        WindowPool::from_arms(self.config.epsilon, store.arms().iter())
    }

    /// "Give me a window to schedule into."
    pub fn select<R: Rng + ?Sized>(&self, store: &ArmStore, rng: &mut R) -> Option<TimeWindow> {
        self.pool(store).select(rng)
    }

    /// Up to `n` selectable windows in exploit order.
    pub fn recommended_windows(&self, store: &ArmStore, n: usize) -> Vec<TimeWindow> {
        self.pool(store).fallback_order().take(n).collect()
    }

    /// Best selectable window on `preferred_day`, else the overall best.
    pub fn suggest(&self, store: &ArmStore, preferred_day: Option<Weekday>) -> Option<TimeWindow> {
        let pool = self.pool(store);
        preferred_day
            .and_then(|day| pool.fallback_order().find(|w| w.day() == day))
            .or_else(|| pool.best())
    }

    fn within_hours(&self, window: &TimeWindow) -> bool {
        (self.config.earliest_hour..=self.config.latest_hour).contains(&window.hour())
    }
}
