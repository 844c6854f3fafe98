pub mod aggregator;
pub mod record;

pub use aggregator::{
    ItemPerformance, ItemTotals, MetricsAggregator, MetricsSummary, RewardTotals, WindowStats,
    WindowStatsSnapshot,
};
pub use record::{MetricRecord, RawMetricRecord};
