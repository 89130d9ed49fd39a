//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{SearchError, SearchIndexError};
use crate::types::{BatchOperationSummary, SearchHit};
use store_indexer_shared::{StoreDocument, StoreId};

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// This trait defines the interface for all search index backend implementations. Implementations
/// are injected into the sync coordinator, the reindex pipeline and the search engine to enable
/// dependency injection and easy testing with mock implementations.
///
/// Write and maintenance methods return `Result<T, SearchIndexError>`; `search` returns
/// `Result<T, SearchError>` so that query failures can be told apart from write failures.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Index a single document in the search index.
    ///
    /// If a document with the same store id already exists, it will be replaced.
    ///
    /// # Arguments
    ///
    /// * `document` - The store document to index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was indexed successfully
    /// * `Err(SearchIndexError)` - If indexing fails
    async fn index_document(&self, document: &StoreDocument) -> Result<(), SearchIndexError>;

    /// Index multiple documents in a single bulk request and return a summary of successful
    /// and failed operations.
    ///
    /// Each document is written under its own store id, so the operation is idempotent.
    ///
    /// # Arguments
    ///
    /// * `documents` - Slice of store documents to index
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk request fails entirely
    async fn bulk_index_documents(
        &self,
        documents: &[StoreDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Fetch a document by store id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(document))` - If the document exists
    /// * `Ok(None)` - If no document is indexed for the store
    /// * `Err(SearchIndexError)` - If the lookup fails
    async fn get_document(&self, store_id: StoreId)
        -> Result<Option<StoreDocument>, SearchIndexError>;

    /// Delete a document from the search index.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    ///
    /// # Arguments
    ///
    /// * `store_id` - The store whose document should be removed
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted (or didn't exist)
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_document(&self, store_id: StoreId) -> Result<(), SearchIndexError>;

    /// Delete every document from the index, keeping the index and its mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of documents removed
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_all_documents(&self) -> Result<u64, SearchIndexError>;

    /// Count the documents currently in the index.
    async fn count_documents(&self) -> Result<u64, SearchIndexError>;

    /// Execute a raw query DSL body against the index.
    ///
    /// # Arguments
    ///
    /// * `query` - A complete search request body (`query`, `sort`, `size`, ...)
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SearchHit>)` - Parsed hits in engine order
    /// * `Err(SearchError)` - If the query fails
    async fn search(&self, query: &Value) -> Result<Vec<SearchHit>, SearchError>;

    /// Create the index with its settings and mappings if it does not exist yet.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Check whether the search cluster is reachable and healthy.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Cluster status is green or yellow
    /// * `Ok(false)` - Cluster answered but is red
    /// * `Err(SearchIndexError)` - If the cluster could not be reached
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
