//! Error types for the store indexer pipeline.

use thiserror::Error;

use store_indexer_repository::{SearchIndexError, SourceError};

/// Errors that can occur in the sync and reindex paths.
///
/// Single-item sync never returns these; only batch, reindex and explicit
/// administrative operations propagate failures.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A batch could not be written to the index.
    #[error("Batch indexing failed: {0}")]
    BatchIndexingError(#[source] SearchIndexError),

    /// A reindex run finished with failed stores.
    #[error("Reindexing failed: {failed} store(s) failed")]
    ReindexFailed { failed: usize, indexed: usize },

    /// Wiping the index failed.
    #[error("Index deletion failed: {0}")]
    IndexDeletionError(#[source] SearchIndexError),

    /// The system-of-record could not be read.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// Any other index operation failed.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),
}

impl PipelineError {
    /// Create a batch indexing error.
    pub fn batch_indexing(err: SearchIndexError) -> Self {
        Self::BatchIndexingError(err)
    }

    /// Create an index deletion error.
    pub fn index_deletion(err: SearchIndexError) -> Self {
        Self::IndexDeletionError(err)
    }

    /// Create a reindex failure.
    pub fn reindex_failed(failed: usize, indexed: usize) -> Self {
        Self::ReindexFailed { failed, indexed }
    }
}
