//! # Store Indexer Pipeline
//!
//! This crate keeps the search index synchronized with the system-of-record.
//!
//! ## Architecture
//!
//! The pipeline has two write paths:
//!
//! 1. **Sync**: `SyncCoordinator` turns store records into index documents,
//!    generating embeddings on the way, and writes or deletes them one at a
//!    time or one batch at a time
//! 2. **Reindex**: `ReindexPipeline` streams every active store from the
//!    system-of-record, cuts the stream into fixed-size batches and drives
//!    the coordinator's batch path, one batch at a time

pub mod errors;
pub mod reindex;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::PipelineError;
pub use reindex::{IndexConsistency, ReindexConfig, ReindexPipeline, ReindexReport, StaleCheckOutcome};
pub use sync::{combined_text, SyncCoordinator, SyncOutcome};
