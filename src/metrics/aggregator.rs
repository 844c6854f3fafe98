use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AggregatorConfig;
use crate::metrics::record::MetricRecord;
use crate::types::identifiers::ContentId;
use crate::types::window::TimeWindow;

/// Running reward totals for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardTotals {
    pub trials: u64,
    pub reward_sum: f64,
    pub reward_sq_sum: f64,
}

impl RewardTotals {
    fn add(&mut self, reward: f64) {
        self.trials += 1;
        self.reward_sum += reward;
        self.reward_sq_sum += reward * reward;
    }

    pub fn stats(&self) -> WindowStats {
        if self.trials == 0 {
            return WindowStats::default();
        }
        let n = self.trials as f64;
        let mean = self.reward_sum / n;
        // Population variance; rounding can push it a hair below zero.
        let variance = (self.reward_sq_sum / n - mean * mean).max(0.0);
        WindowStats {
            trials: self.trials,
            mean_reward: Some(mean),
            reward_variance: Some(variance),
        }
    }
}

/// Derived per-window statistics. `mean_reward` is `None` until the window
/// has at least one trial: "no data yet", not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub trials: u64,
    pub mean_reward: Option<f64>,
    pub reward_variance: Option<f64>,
}

/// Running totals for one content item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTotals {
    pub records: u64,
    pub impressions: u64,
    pub reactions: u64,
    pub comments: u64,
    pub shares: u64,
    pub clicks: u64,
}

impl ItemTotals {
    fn add(&mut self, metric: &MetricRecord) {
        self.records += 1;
        self.impressions = self.impressions.saturating_add(metric.impressions);
        self.reactions = self.reactions.saturating_add(metric.reactions);
        self.comments = self.comments.saturating_add(metric.comments);
        self.shares = self.shares.saturating_add(metric.shares);
        self.clicks = self.clicks.saturating_add(metric.clicks);
    }

    pub fn interactions(&self) -> u64 {
        self.reactions
            .saturating_add(self.comments)
            .saturating_add(self.shares)
            .saturating_add(self.clicks)
    }

    pub fn engagement_rate(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.interactions() as f64 / self.impressions as f64
        }
    }
}

/// An immutable copy of every window's totals, taken at one instant.
///
/// A planning cycle decides every transition against one of these, so
/// records arriving mid-cycle cannot split the decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowStatsSnapshot {
    windows: BTreeMap<TimeWindow, RewardTotals>,
}

impl WindowStatsSnapshot {
    pub fn totals(&self, window: &TimeWindow) -> RewardTotals {
        self.windows.get(window).copied().unwrap_or_default()
    }

    pub fn stats(&self, window: &TimeWindow) -> WindowStats {
        self.totals(window).stats()
    }

    pub fn windows(&self) -> impl Iterator<Item = (&TimeWindow, &RewardTotals)> {
        self.windows.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPerformance {
    pub post_id: ContentId,
    pub engagement_rate: f64,
    pub total_interactions: u64,
    pub impressions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_records: usize,
    pub total_impressions: u64,
    pub total_reactions: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub total_clicks: u64,
    pub avg_impressions: f64,
    pub avg_engagement_rate: f64,
}

/// Folds outcome records into per-window and per-item statistics.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    offset: FixedOffset,
    windows: BTreeMap<TimeWindow, RewardTotals>,
    items: BTreeMap<ContentId, ItemTotals>,
    audit: Vec<MetricRecord>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(&AggregatorConfig::default())
    }
}

impl MetricsAggregator {
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            offset: config.offset(),
            windows: BTreeMap::new(),
            items: BTreeMap::new(),
            audit: Vec::new(),
        }
    }

    /// The window a publication instant falls into, in the audience's offset.
    pub fn window_of(&self, published_at: DateTime<Utc>) -> TimeWindow {
        TimeWindow::from_local(published_at.with_timezone(&self.offset).naive_local())
    }

    /// Apply one record. Records are validated at parse time, so this
    /// cannot fail.
    pub fn record(&mut self, metric: MetricRecord) -> TimeWindow {
        let window = self.window_of(metric.published_at);
        let reward = metric.reward();

        self.windows.entry(window).or_default().add(reward);
        self.items
            .entry(metric.post_id.clone())
            .or_default()
            .add(&metric);

        debug!(post_id = %metric.post_id, %window, reward, "metric recorded");
        self.audit.push(metric);
        window
    }

    pub fn record_all(&mut self, metrics: impl IntoIterator<Item = MetricRecord>) -> usize {
        metrics.into_iter().map(|m| self.record(m)).count()
    }

    /// `(trials, mean)` for a window; unknown windows report `(0, None)`.
    pub fn window_stats(&self, window: &TimeWindow) -> WindowStats {
        self.windows
            .get(window)
            .map(RewardTotals::stats)
            .unwrap_or_default()
    }

    pub fn item_totals(&self, post_id: &ContentId) -> Option<&ItemTotals> {
        self.items.get(post_id)
    }

    pub fn snapshot(&self) -> WindowStatsSnapshot {
        WindowStatsSnapshot {
            windows: self.windows.clone(),
        }
    }

    /// Raw records in arrival order, kept for audit only.
    pub fn raw_records(&self) -> &[MetricRecord] {
        &self.audit
    }

    pub fn records_since(&self, cutoff: DateTime<Utc>) -> Vec<&MetricRecord> {
        self.audit
            .iter()
            .filter(|m| m.published_at >= cutoff)
            .collect()
    }

    pub fn summary(&self) -> MetricsSummary {
        let total_records = self.audit.len();
        if total_records == 0 {
            return MetricsSummary::default();
        }

        let mut summary = MetricsSummary {
            total_records,
            ..MetricsSummary::default()
        };
        let mut reward_sum = 0.0;
        for m in &self.audit {
            summary.total_impressions = summary.total_impressions.saturating_add(m.impressions);
            summary.total_reactions = summary.total_reactions.saturating_add(m.reactions);
            summary.total_comments = summary.total_comments.saturating_add(m.comments);
            summary.total_shares = summary.total_shares.saturating_add(m.shares);
            summary.total_clicks = summary.total_clicks.saturating_add(m.clicks);
            reward_sum += m.reward();
        }
        summary.avg_impressions = summary.total_impressions as f64 / total_records as f64;
        summary.avg_engagement_rate = reward_sum / total_records as f64;
        summary
    }

    /// Best windows by mean reward among those with at least `min_trials`.
    /// Ties go to the earlier window in the week.
    pub fn top_windows(&self, min_trials: u64, limit: usize) -> Vec<(TimeWindow, WindowStats)> {
        let mut ranked: Vec<(TimeWindow, WindowStats)> = self
            .windows
            .iter()
            .map(|(w, t)| (*w, t.stats()))
            .filter(|(_, s)| s.trials >= min_trials.max(1))
            .collect();
        ranked.sort_by(|(wa, a), (wb, b)| {
            let ma = a.mean_reward.unwrap_or(0.0);
            let mb = b.mean_reward.unwrap_or(0.0);
            mb.total_cmp(&ma).then_with(|| wa.cmp(wb))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Items ranked by engagement rate, then id.
    pub fn top_items(&self, limit: usize) -> Vec<ItemPerformance> {
        let mut ranked: Vec<ItemPerformance> = self
            .items
            .iter()
            .map(|(id, totals)| ItemPerformance {
                post_id: id.clone(),
                engagement_rate: totals.engagement_rate(),
                total_interactions: totals.interactions(),
                impressions: totals.impressions,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.engagement_rate
                .total_cmp(&a.engagement_rate)
                .then_with(|| a.post_id.cmp(&b.post_id))
        });
        ranked.truncate(limit);
        ranked
    }
}
