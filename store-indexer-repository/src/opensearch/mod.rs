//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, together with the index mappings and the
//! query DSL builders used by the search engine.

mod client;
mod index_config;
pub mod queries;

pub use client::OpenSearchClient;
pub use index_config::{get_index_settings, IndexConfig, DEFAULT_INDEX_ALIAS};
