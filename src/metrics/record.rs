use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::identifiers::ContentId;
use crate::types::input::InputError;

/// One outcome observation for a published item. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub post_id: ContentId,
    pub impressions: u64,
    pub reactions: u64,
    pub comments: u64,
    pub shares: u64,
    pub clicks: u64,
    pub published_at: DateTime<Utc>,
}

/// Wire shape before validation. Counts are signed so negative input is
/// reported as such; `clicks` is optional and an upstream
/// `engagement_rate` is accepted but ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMetricRecord {
    pub post_id: String,
    pub impressions: i64,
    pub reactions: i64,
    pub comments: i64,
    pub shares: i64,
    #[serde(default)]
    pub clicks: i64,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub engagement_rate: Option<f64>,
}

impl MetricRecord {
    pub fn from_json(raw: &str) -> Result<Self, InputError> {
        let raw: RawMetricRecord = serde_json::from_str(raw)?;
        MetricRecord::try_from(raw)
    }

    /// Parse a JSON array of records. The whole batch is rejected if any
    /// record is invalid.
    pub fn batch_from_json(raw: &str) -> Result<Vec<Self>, InputError> {
        let raw: Vec<RawMetricRecord> = serde_json::from_str(raw)?;
        raw.into_iter().map(MetricRecord::try_from).collect()
    }

    pub fn interactions(&self) -> u64 {
        self.reactions
            .saturating_add(self.comments)
            .saturating_add(self.shares)
            .saturating_add(self.clicks)
    }

    /// `(reactions + comments + shares + clicks) / max(impressions, 1)`.
    pub fn reward(&self) -> f64 {
        if self.impressions == 0 {
            return 0.0;
        }
        self.interactions() as f64 / self.impressions as f64
    }
}

impl TryFrom<RawMetricRecord> for MetricRecord {
    type Error = InputError;

    fn try_from(raw: RawMetricRecord) -> Result<Self, Self::Error> {
        let post_id = ContentId::new(raw.post_id)?;
        let count = |field: &'static str, value: i64| -> Result<u64, InputError> {
            u64::try_from(value).map_err(|_| InputError::NegativeCount {
                post_id: post_id.as_str().to_string(),
                field,
                value,
            })
        };

        Ok(MetricRecord {
            impressions: count("impressions", raw.impressions)?,
            reactions: count("reactions", raw.reactions)?,
            comments: count("comments", raw.comments)?,
            shares: count("shares", raw.shares)?,
            clicks: count("clicks", raw.clicks)?,
            published_at: raw.published_at,
            post_id,
        })
    }
}
