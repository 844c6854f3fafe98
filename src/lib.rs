//! Decision engine for a content operator.
//!
//! `slot-engine` covers two independent pipelines:
//!
//! - **Retrieval**: an [`index::EmbeddingStore`] holds precomputed embeddings
//!   of historical content and swaps snapshots atomically; a
//!   [`selection::SimilarityRanker`] returns the top-k items by cosine
//!   similarity, deterministically.
//! - **Scheduling**: a [`metrics::MetricsAggregator`] folds outcome records
//!   into per-window rewards; a [`experiment::WindowExperimentManager`] runs
//!   an epsilon-greedy experiment over posting windows once per planning
//!   cycle; a [`schedule::Scheduler`] places items into open windows without
//!   double-booking.
//!
//! Everything is synchronous and in-memory. The crate performs no file or
//! network I/O and installs no `tracing` subscriber.

pub mod config;
pub mod content;
pub mod experiment;
pub mod index;
pub mod metrics;
pub mod schedule;
pub mod selection;
pub mod types;
