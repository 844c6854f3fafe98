// The store only ever swaps whole snapshots:
// no per-item insert or delete
// readers hold an Arc and never see a half-built index

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::content::ContentItem;
use crate::index::snapshot::IndexSnapshot;
use crate::types::input::InputError;

/// Holds the active snapshot of historical content embeddings.
#[derive(Debug, Default)]
pub struct EmbeddingStore {
    active: RwLock<Arc<IndexSnapshot>>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a new snapshot from `items` and make it the active one.
    ///
    /// On error the previous snapshot stays active.
    pub fn index(&self, items: Vec<ContentItem>) -> Result<Arc<IndexSnapshot>, InputError> {
        let snapshot = Arc::new(IndexSnapshot::build(items)?);

        // A poisoned lock still guards a complete snapshot: writers only
        // ever store a fully built Arc.
        let mut guard = self.active.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&snapshot);
        drop(guard);

        info!(
            version = snapshot.version(),
            items = snapshot.len(),
            dimension = ?snapshot.dimension(),
            "embedding index swapped"
        );
        Ok(snapshot)
    }

    /// The snapshot currently answering queries.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        let guard = self.active.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}
