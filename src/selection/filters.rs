use crate::content::ContentItem;
use crate::types::ranking::RankOptions;

/// Whether `item` is eligible for ranking under `options`.
pub fn admits(options: &RankOptions, item: &ContentItem) -> bool {
    options.tags.is_empty() || item.tags.matches_any(&options.tags)
}

/// Whether a score clears the configured threshold.
pub fn clears_threshold(min_similarity: Option<f64>, score: f64) -> bool {
    match min_similarity {
        Some(min) => score >= min,
        None => true,
    }
}
