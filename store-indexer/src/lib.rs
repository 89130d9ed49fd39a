//! # Store Indexer
//!
//! Main library for the store search indexer.
//!
//! This crate reads configuration from the environment, wires the
//! OpenSearch client, the embedding client and the system-of-record into
//! the sync, reindex and search components, and exposes them to the
//! command line.

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{Dependencies, IndexerConfig};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error(transparent)]
    PipelineError(#[from] store_indexer_pipeline::PipelineError),

    /// Search index error.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] store_indexer_repository::SearchIndexError),

    /// System-of-record error.
    #[error("Store source error: {0}")]
    SourceError(#[from] store_indexer_repository::SourceError),

    /// Embedding client error.
    #[error("Embedding error: {0}")]
    EmbeddingError(#[from] store_indexer_embedding::EmbeddingError),

    /// A single-store sync was attempted and failed; details are in the logs.
    #[error("Sync of store {0} failed")]
    SyncFailed(store_indexer_shared::StoreId),

    /// Output serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
