//! Single-item and batch synchronization of store records into the index.
//!
//! Single-item operations run inline with the write that triggered them, so
//! they never fail outward: errors are logged and the store write proceeds.
//! The index is repaired by a later reindex. Batch indexing is used by the
//! reindex pipeline and does propagate write failures.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use store_indexer_embedding::EmbeddingClient;
use store_indexer_repository::{SearchIndexError, SearchIndexProvider};
use store_indexer_shared::{StoreDocument, StoreId, StoreRecord};

/// Build the text that is embedded for a store.
///
/// Name, description and address in that order, blank parts skipped,
/// joined with single spaces.
pub fn combined_text(store: &StoreRecord) -> String {
    [&store.name, &store.description, &store.address]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// What a single-item sync ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The document was written; `embedded` tells whether it carries a vector.
    Indexed { embedded: bool },
    /// The store was soft-deleted or removed and its document deleted.
    Deleted,
    /// The operation failed and was logged; the index may be stale.
    Failed,
}

/// Converts store records into index documents and writes them.
pub struct SyncCoordinator {
    index: Arc<dyn SearchIndexProvider>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl SyncCoordinator {
    pub fn new(index: Arc<dyn SearchIndexProvider>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { index, embedder }
    }

    /// Index a newly created store.
    ///
    /// # Arguments
    ///
    /// * `store` - The store as just written to the system-of-record
    /// * `owner_name` - Owner display name to denormalize into the document
    ///
    /// # Returns
    ///
    /// The outcome; failures are logged and reported as `SyncOutcome::Failed`,
    /// never as an error.
    #[instrument(skip(self, store, owner_name), fields(store_id = store.id))]
    pub async fn index_one(&self, store: &StoreRecord, owner_name: Option<&str>) -> SyncOutcome {
        self.write_one(store, owner_name, "index").await
    }

    /// Re-index an updated store, regenerating its embedding.
    #[instrument(skip(self, store, owner_name), fields(store_id = store.id))]
    pub async fn update_one(&self, store: &StoreRecord, owner_name: Option<&str>) -> SyncOutcome {
        self.write_one(store, owner_name, "update").await
    }

    /// Index a batch of stores with one embedding call and one bulk write.
    ///
    /// Vectors are paired with stores by position. If the provider returns
    /// fewer vectors than requested, or the embedding call fails outright,
    /// the remaining documents are written without an embedding. Soft-deleted
    /// stores are skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of documents written
    /// * `Err(PipelineError::BatchIndexingError)` - If the bulk write failed
    ///   or any document in it was rejected
    #[instrument(skip(self, stores), fields(count = stores.len()))]
    pub async fn index_batch(&self, stores: &[StoreRecord]) -> Result<usize, PipelineError> {
        let active: Vec<&StoreRecord> = stores.iter().filter(|s| !s.is_deleted()).collect();
        if active.len() < stores.len() {
            debug!(
                skipped = stores.len() - active.len(),
                "Skipping soft-deleted stores in batch"
            );
        }
        if active.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = active.iter().map(|store| combined_text(store)).collect();
        let embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                warn!(error = %e, count = texts.len(), "Batch embedding failed, indexing without vectors");
                Vec::new()
            }
        };

        if embeddings.len() != active.len() {
            warn!(
                embeddings = embeddings.len(),
                stores = active.len(),
                "Embedding count does not match store count, missing embeddings stored as null"
            );
        }

        let mut embeddings = embeddings.into_iter();
        let documents: Vec<StoreDocument> = active
            .iter()
            .map(|store| {
                let embedding = embeddings.next().and_then(|v| self.checked(store.id, v));
                StoreDocument::from_record(store, None, embedding)
            })
            .collect();

        let summary = self
            .index
            .bulk_index_documents(&documents)
            .await
            .map_err(|e| {
                error!(error = %e, count = documents.len(), "Failed to index store batch");
                PipelineError::batch_indexing(e)
            })?;

        if summary.failed > 0 {
            error!(
                failed = summary.failed,
                ids = ?summary.failed_ids(),
                "Store batch partially rejected by the index"
            );
            return Err(PipelineError::batch_indexing(SearchIndexError::bulk_operation(
                format!("{} of {} documents rejected", summary.failed, summary.total),
            )));
        }

        info!(count = documents.len(), "Indexed store batch");
        Ok(documents.len())
    }

    /// Remove a store's document from the index.
    ///
    /// A missing document is not an error. Failures are logged and reported
    /// as `SyncOutcome::Failed`.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, store_id: StoreId) -> SyncOutcome {
        match self.index.delete_document(store_id).await {
            Ok(()) => {
                info!(store_id = store_id, "Deleted store from index");
                SyncOutcome::Deleted
            }
            Err(e) => {
                error!(store_id = store_id, error = %e, "Failed to delete store from index");
                SyncOutcome::Failed
            }
        }
    }

    async fn write_one(
        &self,
        store: &StoreRecord,
        owner_name: Option<&str>,
        action: &'static str,
    ) -> SyncOutcome {
        if store.is_deleted() {
            debug!(store_id = store.id, "Store is soft-deleted, removing from index");
            return self.delete_one(store.id).await;
        }

        let embedding = match self.embedder.embed(&combined_text(store)).await {
            Ok(vector) => self.checked(store.id, vector),
            Err(e) => {
                warn!(store_id = store.id, error = %e, "Embedding failed, indexing without vector");
                None
            }
        };
        let embedded = embedding.is_some();

        let document = StoreDocument::from_record(store, owner_name.map(str::to_string), embedding);
        match self.index.index_document(&document).await {
            Ok(()) => {
                info!(
                    store_id = store.id,
                    action,
                    embedding_size = document.embedding_len(),
                    "Synced store to index"
                );
                SyncOutcome::Indexed { embedded }
            }
            Err(e) => {
                error!(store_id = store.id, action, error = %e, "Failed to sync store to index");
                SyncOutcome::Failed
            }
        }
    }

    /// Keep a vector only if it has the dimensionality the index expects.
    fn checked(&self, store_id: StoreId, vector: Vec<f32>) -> Option<Vec<f32>> {
        let expected = self.embedder.dimensions();
        if vector.is_empty() || vector.len() != expected {
            warn!(
                store_id = store_id,
                got = vector.len(),
                expected = expected,
                "Discarding embedding with unexpected dimensions"
            );
            return None;
        }
        Some(vector)
    }
}
