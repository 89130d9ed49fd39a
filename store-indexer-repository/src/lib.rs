//! # Store Indexer Repository
//!
//! This crate provides traits and implementations for the two external
//! systems the indexer talks to: the search index (OpenSearch) and the
//! system-of-record that owns store rows. It includes definitions for errors,
//! interfaces, the index mappings, the query DSL builders, and a JSON-lines
//! export reader for the system-of-record.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod source;
pub mod types;

pub use config::SearchIndexConfig;
pub use errors::{SearchError, SearchIndexError, SourceError};
pub use interfaces::{SearchIndexProvider, StoreSource, StoreStream};
pub use opensearch::{IndexConfig, OpenSearchClient};
pub use source::JsonlStoreSource;
pub use types::{BatchOperationResult, BatchOperationSummary, SearchHit};
