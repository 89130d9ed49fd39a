//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, CountParts, DeleteByQueryParts, DeleteParts, GetParts, IndexParts, OpenSearch,
    SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::errors::{SearchError, SearchIndexError};
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::types::{BatchOperationResult, BatchOperationSummary, SearchHit};
use store_indexer_shared::{document_id, StoreDocument, StoreId};

/// OpenSearch client implementation.
///
/// All reads and writes go through the configured alias; the physical
/// index name is only used when the index is created.
///
/// # Example
///
/// ```ignore
/// use store_indexer_repository::{IndexConfig, OpenSearchClient, SearchIndexConfig};
///
/// let client = OpenSearchClient::new(
///     "http://localhost:9200",
///     IndexConfig::default(),
///     SearchIndexConfig::default(),
/// )
/// .await?;
/// client.ensure_index_exists().await?;
/// client.index_document(&document).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
    config: SearchIndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and layout
    /// * `config` - Client limits and timeouts
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(
        url: &str,
        index_config: IndexConfig,
        config: SearchIndexConfig,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
            config,
        })
    }

    /// The alias every request is sent to.
    pub fn alias(&self) -> &str {
        &self.index_config.alias
    }

    /// Parse a single hit of a search response.
    ///
    /// Returns `None` if the hit has no `_source` or the source does not
    /// deserialize into a `StoreDocument`.
    fn parse_hit(hit: &Value) -> Option<SearchHit> {
        let source = hit.get("_source")?;
        let document: StoreDocument = serde_json::from_value(source.clone()).ok()?;

        let score = hit
            .get("_score")
            .and_then(Value::as_f64)
            .map(|score| score as f32);
        let sort = hit
            .get("sort")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Some(SearchHit {
            document,
            score,
            sort,
        })
    }

    /// Build per-document results from a bulk response body.
    ///
    /// Items are matched to documents by position; OpenSearch answers bulk
    /// items in request order.
    fn parse_bulk_response(documents: &[StoreDocument], body: &Value) -> BatchOperationSummary {
        let empty = Vec::new();
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .unwrap_or(&empty);

        let results = documents
            .iter()
            .enumerate()
            .map(|(position, document)| {
                let item = items.get(position).and_then(|item| item.get("index"));
                let error = match item {
                    None => Some(SearchIndexError::bulk_operation("Missing bulk response item")),
                    Some(item) => item
                        .get("error")
                        .map(|e| SearchIndexError::index(e.to_string())),
                };

                BatchOperationResult {
                    store_id: document.store_id,
                    success: error.is_none(),
                    error,
                }
            })
            .collect();

        BatchOperationSummary::from_results(results)
    }

    /// Read a failed response's body and log it.
    async fn failure_body(response: Response, operation: &str) -> String {
        let status = response.status_code();
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, operation, "Request failed");
        format!("{} failed with status {}: {}", operation, status, error_body)
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    /// Index a single document under its store id, replacing any previous version.
    #[instrument(skip(self, document), fields(store_id = document.store_id))]
    async fn index_document(&self, document: &StoreDocument) -> Result<(), SearchIndexError> {
        let doc_id = document.document_id();

        let response = self
            .client
            .index(IndexParts::IndexId(self.alias(), &doc_id))
            .body(document)
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::index(
                Self::failure_body(response, "Index").await,
            ));
        }

        debug!(doc_id = %doc_id, "Document indexed");
        Ok(())
    }

    /// Index documents with one bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document results, including item-level failures
    /// * `Err(SearchIndexError::BatchSizeExceeded)` - If the batch is larger than the configured limit
    /// * `Err(SearchIndexError)` - If the request itself fails
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index_documents(
        &self,
        documents: &[StoreDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }
        if let Some(max) = self.config.exceeded_limit(documents.len()) {
            return Err(SearchIndexError::batch_size_exceeded(documents.len(), max));
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            let source = serde_json::to_value(document)
                .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
            body.push(json!({"index": {"_index": self.alias(), "_id": document.document_id()}}).into());
            body.push(source.into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(self.alias()))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_operation(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::bulk_operation(
                Self::failure_body(response, "Bulk index").await,
            ));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let summary = Self::parse_bulk_response(documents, &response_body);
        if summary.failed > 0 {
            warn!(
                failed = summary.failed,
                total = summary.total,
                "Bulk index completed with item failures"
            );
        } else {
            debug!(total = summary.total, "Bulk index completed");
        }

        Ok(summary)
    }

    async fn get_document(
        &self,
        store_id: StoreId,
    ) -> Result<Option<StoreDocument>, SearchIndexError> {
        let doc_id = document_id(store_id);

        let response = self
            .client
            .get(GetParts::IndexId(self.alias(), &doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::get(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SearchIndexError::get(
                Self::failure_body(response, "Get").await,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        match body.get("_source") {
            Some(source) => serde_json::from_value(source.clone())
                .map(Some)
                .map_err(|e| SearchIndexError::serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Delete a document from the search index.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    #[instrument(skip(self))]
    async fn delete_document(&self, store_id: StoreId) -> Result<(), SearchIndexError> {
        let doc_id = document_id(store_id);

        let response = self
            .client
            .delete(DeleteParts::IndexId(self.alias(), &doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            return Err(SearchIndexError::delete(
                Self::failure_body(response, "Delete").await,
            ));
        }

        debug!(doc_id = %doc_id, "Document deleted");
        Ok(())
    }

    /// Remove every document with a `match_all` delete-by-query.
    #[instrument(skip(self))]
    async fn delete_all_documents(&self) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[self.alias()]))
            .body(json!({ "query": { "match_all": {} } }))
            .refresh(true)
            .conflicts(opensearch::params::Conflicts::Proceed)
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::delete(
                Self::failure_body(response, "Delete by query").await,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
        let deleted = body.get("deleted").and_then(Value::as_u64).unwrap_or(0);

        info!(deleted = deleted, alias = %self.alias(), "Deleted all documents");
        Ok(deleted)
    }

    async fn count_documents(&self) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .count(CountParts::Index(&[self.alias()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::index_management(
                Self::failure_body(response, "Count").await,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| SearchIndexError::serialization("Count response has no count"))
    }

    /// Execute a search request body and parse its hits.
    ///
    /// Hits that cannot be parsed are skipped with a warning rather than
    /// failing the whole query.
    async fn search(&self, query: &Value) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.alias()]))
            .body(query)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let raw_hits = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::parse("Response has no hits array"))?;

        let hits = raw_hits
            .iter()
            .filter_map(|hit| {
                let parsed = Self::parse_hit(hit);
                if parsed.is_none() {
                    warn!(id = ?hit.get("_id"), "Skipping unparseable search hit");
                }
                parsed
            })
            .collect();

        Ok(hits)
    }

    /// Create the physical index and its alias unless the alias already resolves.
    #[instrument(skip(self))]
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.alias()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(alias = %self.alias(), "Index already exists");
            return Ok(());
        }

        let index_name = self.index_config.index_name();
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_settings(&self.index_config))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_management(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::index_management(
                Self::failure_body(response, "Create index").await,
            ));
        }

        info!(index = %index_name, alias = %self.alias(), "Created index");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
        let status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(status = %status, "OpenSearch cluster status");
        Ok(status == "green" || status == "yellow")
    }
}
