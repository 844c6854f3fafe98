use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::experiment::config::ExperimentConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("earliest_hour {earliest} is after latest_hour {latest}")]
    InvertedHours { earliest: u32, latest: u32 },
    #[error("Baseline window list is empty")]
    NoBaselines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Rankings against fewer items carry a stale-index warning.
    pub min_index_items: usize,
    pub min_similarity: Option<f64>,
}

impl IndexConfig {
    pub fn v0() -> Self {
        Self {
            min_index_items: 5,
            min_similarity: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::v0()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Audience timezone as minutes east of UTC.
    pub utc_offset_minutes: i32,
}

impl AggregatorConfig {
    pub fn v0() -> Self {
        Self {
            utc_offset_minutes: 0,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::v0()
    }
}

/// Everything the engine consumes. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub experiment: ExperimentConfig,
    pub index: IndexConfig,
    pub aggregator: AggregatorConfig,
}

impl EngineConfig {
    /// Parse and validate. Missing sections fall back to defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let exp = &self.experiment;
        unit_interval("epsilon", exp.epsilon)?;
        unit_interval("prune_fraction", exp.prune_fraction)?;
        in_range(
            "min_trials_for_winner",
            exp.min_trials_for_winner as f64,
            1.0,
            f64::from(u32::MAX),
        )?;
        in_range(
            "experiment_spread_hours",
            f64::from(exp.experiment_spread_hours),
            0.0,
            23.0,
        )?;
        in_range("latest_hour", f64::from(exp.latest_hour), 0.0, 23.0)?;
        if exp.earliest_hour > exp.latest_hour {
            return Err(ConfigError::InvertedHours {
                earliest: exp.earliest_hour,
                latest: exp.latest_hour,
            });
        }
        if exp.baseline_windows.is_empty() {
            return Err(ConfigError::NoBaselines);
        }
        if let Some(min) = self.index.min_similarity {
            in_range("min_similarity", min, -1.0, 1.0)?;
        }
        // FixedOffset accepts strictly less than one day either way.
        in_range(
            "utc_offset_minutes",
            f64::from(self.aggregator.utc_offset_minutes),
            -1439.0,
            1439.0,
        )?;
        Ok(())
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    in_range(field, value, 0.0, 1.0)
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons and is rejected here too.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}
