pub mod snapshot;
pub mod store;

pub use snapshot::IndexSnapshot;
pub use store::EmbeddingStore;
