use serde::{Deserialize, Serialize};

use crate::content::ContentItem;
use crate::types::identifiers::ContentId;

/// A query embedding. Ephemeral: built per request, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    pub values: Vec<f32>,
}

impl QueryVector {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// Knobs for a single ranking request.
#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Results scoring below this are dropped before the top-k cut.
    pub min_similarity: Option<f64>,
    /// When non-empty, only items carrying at least one of these tags
    /// (case-insensitive) are considered.
    pub tags: Vec<String>,
}

/// One ranked snippet, handed to the drafting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSnippet {
    pub post_id: ContentId,
    pub similarity_score: f64,
    pub reason: String,
}

/// Advisory: the index is smaller than the configured minimum, so results may
/// not be representative. Recommendations are still returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleIndexWarning {
    pub indexed_items: usize,
    pub minimum_items: usize,
}

/// Metadata describing how a ranking was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingMetadata {
    pub index_version: String,
    pub k: usize,
    pub items_considered: usize,
    pub items_returned: usize,
    pub items_below_threshold: usize,
}

/// The result of a ranking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub snippets: Vec<RankedSnippet>,
    pub ranking: RankingMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<StaleIndexWarning>,
}

/// Internal: an item that has been scored but not yet cut to k.
#[derive(Debug, Clone)]
pub struct ScoredItem<'a> {
    pub item: &'a ContentItem,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    #[error("Query vector has length {actual}, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
