pub mod filters;
pub mod ranking;

use tracing::{debug, warn};

use crate::config::IndexConfig;
use crate::index::IndexSnapshot;
use crate::types::ranking::{
	QueryVector, RankError, RankOptions, RankedSnippet, Ranking, RankingMetadata, ScoredItem,
	StaleIndexWarning,
};
pub use ranking::{cosine_similarity, similarity_reason, CosineSimilarity, Similarity};

/// Ranks indexed items against a query vector. Read-only over the snapshot.
pub struct SimilarityRanker<S> {
	similarity: S,
	config: IndexConfig,
}

impl Default for SimilarityRanker<CosineSimilarity> {
	fn default() -> Self {
		Self {
			similarity: CosineSimilarity,
			config: IndexConfig::default(),
		}
	}
}

impl<S> SimilarityRanker<S>
where
	S: Similarity,
{
	pub fn new(similarity: S, config: IndexConfig) -> Self {
		Self { similarity, config }
	}

	/// Top `k` items by similarity, with the configured threshold.
	pub fn rank(
		&self,
		snapshot: &IndexSnapshot,
		query: &QueryVector,
		k: usize,
	) -> Result<Ranking, RankError> {
		let options = RankOptions {
			min_similarity: self.config.min_similarity,
			tags: Vec::new(),
		};
		self.rank_with(snapshot, query, k, &options)
	}

	pub fn rank_with(
		&self,
		snapshot: &IndexSnapshot,
		query: &QueryVector,
		k: usize,
		options: &RankOptions,
	) -> Result<Ranking, RankError> {
		// 0. Dimension check; an empty index has nothing to mismatch
		if let Some(expected) = snapshot.dimension() {
			if query.dimension() != expected {
				return Err(RankError::DimensionMismatch {
					expected,
					actual: query.dimension(),
				});
			}
		}

		let warning = self.stale_warning(snapshot);

		// 1. Scoring Phase
		let mut scored: Vec<ScoredItem> = snapshot
			.items()
			.iter()
			.filter(|item| filters::admits(options, item))
			.map(|item| ScoredItem {
				item,
				score: self.similarity.score(&item.embedding, &query.values),
			})
			.collect();
		let items_considered = scored.len();

		// 2. Ordering Phase
		// Sort globally by (score desc, created_at desc, id asc)
		scored.sort_by(|a, b| {
			b.score
				.total_cmp(&a.score)
				.then_with(|| b.item.created_at.cmp(&a.item.created_at))
				.then_with(|| a.item.id.cmp(&b.item.id))
		});

		debug_assert!(scored.windows(2).all(|w| {
			let (a, b) = (&w[0], &w[1]);
			a.score > b.score
				|| (a.score == b.score && a.item.created_at >= b.item.created_at)
		}));

		// 3. Threshold and cut
		let before_threshold = scored.len();
		scored.retain(|s| filters::clears_threshold(options.min_similarity, s.score));
		let items_below_threshold = before_threshold - scored.len();
		scored.truncate(k);

		let snippets: Vec<RankedSnippet> = scored
			.into_iter()
			.map(|s| RankedSnippet {
				post_id: s.item.id.clone(),
				similarity_score: s.score,
				reason: similarity_reason(s.score),
			})
			.collect();

		debug!(
			index_version = snapshot.version(),
			k,
			returned = snippets.len(),
			"ranked query"
		);

		let ranking = RankingMetadata {
			index_version: snapshot.version().to_string(),
			k,
			items_considered,
			items_returned: snippets.len(),
			items_below_threshold,
		};

		Ok(Ranking {
			snippets,
			ranking,
			warning,
		})
	}

	fn stale_warning(&self, snapshot: &IndexSnapshot) -> Option<StaleIndexWarning> {
		if snapshot.len() >= self.config.min_index_items {
			return None;
		}
		warn!(
			indexed_items = snapshot.len(),
			minimum_items = self.config.min_index_items,
			"ranking against an undersized index"
		);
		Some(StaleIndexWarning {
			indexed_items: snapshot.len(),
			minimum_items: self.config.min_index_items,
		})
	}
}
