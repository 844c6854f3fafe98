use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::content::ContentItem;
use crate::types::identifiers::ContentId;
use crate::types::input::InputError;

/// An immutable, fully built view of the indexed items.
///
/// Items are held sorted by id. `version` is a content hash over every
/// `(id, embedding)` pair, so two snapshots built from the same items carry
/// the same version regardless of input order.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    version: String,
    dimension: Option<usize>,
    items: Vec<ContentItem>,
    positions: BTreeMap<ContentId, usize>,
}

impl IndexSnapshot {
    pub fn empty() -> Self {
        IndexSnapshot {
            version: version_of(&[]),
            dimension: None,
            items: Vec::new(),
            positions: BTreeMap::new(),
        }
    }

    /// Validate and build a snapshot. Nothing is returned unless every item
    /// passes.
    pub fn build(items: Vec<ContentItem>) -> Result<Self, InputError> {
        // 1. Sort by id for determinism
        let mut sorted = items;
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        // 1b. Duplicates are adjacent after the sort
        for pair in sorted.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(InputError::DuplicateId(pair[0].id.as_str().to_string()));
            }
        }

        // 2. Single dimension across the index
        let dimension = sorted.first().map(ContentItem::dimension);
        if let Some(expected) = dimension {
            if let Some(bad) = sorted.iter().find(|i| i.dimension() != expected) {
                return Err(InputError::InconsistentDimensions {
                    id: bad.id.as_str().to_string(),
                    expected,
                    actual: bad.dimension(),
                });
            }
        }

        let version = version_of(&sorted);

        let positions = sorted
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id.clone(), pos))
            .collect();

        Ok(IndexSnapshot {
            version,
            dimension,
            items: sorted,
            positions,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Vector length shared by every item; `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn get(&self, id: &ContentId) -> Option<&ContentItem> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    /// Items carrying any of `tags` (case-insensitive), in id order.
    pub fn find_by_tags<S: AsRef<str>>(&self, tags: &[S], limit: usize) -> Vec<&ContentItem> {
        self.items
            .iter()
            .filter(|item| item.tags.matches_any(tags))
            .take(limit)
            .collect()
    }
}

/// "id:" followed by the little-endian embedding bytes, one line per item.
fn version_of(sorted: &[ContentItem]) -> String {
    let mut hasher = Sha256::new();
    for item in sorted {
        hasher.update(item.id.as_str().as_bytes());
        hasher.update(b":");
        for value in &item.embedding {
            hasher.update(value.to_le_bytes());
        }
        hasher.update(b"\n");
    }
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

impl Default for IndexSnapshot {
    fn default() -> Self {
        IndexSnapshot::empty()
    }
}
