//! In-memory collaborators shared by the pipeline tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::{stream, StreamExt};
use serde_json::Value;

use store_indexer_embedding::{EmbeddingClient, EmbeddingError};
use store_indexer_repository::{
    BatchOperationResult, BatchOperationSummary, SearchError, SearchHit, SearchIndexError,
    SearchIndexProvider, SourceError, StoreSource, StoreStream,
};
use store_indexer_shared::{StoreCategory, StoreDocument, StoreId, StoreRecord};

/// Dimensionality produced by `MockEmbedder`.
pub const DIMS: usize = 4;

pub fn store(id: StoreId) -> StoreRecord {
    StoreRecord {
        id,
        owner_id: 10,
        name: format!("Store {}", id),
        phone: "010-0000-0000".to_string(),
        description: "Neighborhood bakery".to_string(),
        business_number: "123-45-67890".to_string(),
        address: "1 Main St".to_string(),
        neighborhood: "Seogyo".to_string(),
        latitude: 37.55,
        longitude: 126.92,
        image_url: "https://img.example/store.png".to_string(),
        category: StoreCategory::Food,
        weekday_open_time: None,
        weekday_close_time: None,
        weekend_open_time: None,
        weekend_close_time: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        deleted_at: None,
    }
}

/// Search index held in a map, with switchable failures.
#[derive(Default)]
pub struct MockIndex {
    docs: Mutex<BTreeMap<StoreId, StoreDocument>>,
    bulk_calls: AtomicUsize,
    bulk_sizes: Mutex<Vec<usize>>,
    fail_writes: AtomicBool,
    fail_bulk_call: Mutex<Option<usize>>,
    rejected: Mutex<Vec<StoreId>>,
    fail_delete_all: AtomicBool,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Fail only the n-th bulk request (1-based).
    pub fn fail_bulk_call(&self, n: usize) {
        *self.fail_bulk_call.lock().unwrap() = Some(n);
    }

    pub fn reject_ids(&self, ids: &[StoreId]) {
        self.rejected.lock().unwrap().extend_from_slice(ids);
    }

    pub fn fail_delete_all(&self) {
        self.fail_delete_all.store(true, Ordering::SeqCst);
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    pub fn bulk_sizes(&self) -> Vec<usize> {
        self.bulk_sizes.lock().unwrap().clone()
    }

    pub fn insert(&self, document: StoreDocument) {
        self.docs.lock().unwrap().insert(document.store_id, document);
    }

    fn writes_failing(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndexProvider for MockIndex {
    async fn index_document(&self, document: &StoreDocument) -> Result<(), SearchIndexError> {
        if self.writes_failing() {
            return Err(SearchIndexError::index("index unavailable"));
        }
        self.insert(document.clone());
        Ok(())
    }

    async fn bulk_index_documents(
        &self,
        documents: &[StoreDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let call = self.bulk_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.bulk_sizes.lock().unwrap().push(documents.len());

        if self.writes_failing() || *self.fail_bulk_call.lock().unwrap() == Some(call) {
            return Err(SearchIndexError::bulk_operation("bulk request failed"));
        }

        let rejected = self.rejected.lock().unwrap().clone();
        let results = documents
            .iter()
            .map(|document| {
                let success = !rejected.contains(&document.store_id);
                if success {
                    self.insert(document.clone());
                }
                BatchOperationResult {
                    store_id: document.store_id,
                    success,
                    error: (!success).then(|| SearchIndexError::index("rejected")),
                }
            })
            .collect();

        Ok(BatchOperationSummary::from_results(results))
    }

    async fn get_document(
        &self,
        store_id: StoreId,
    ) -> Result<Option<StoreDocument>, SearchIndexError> {
        Ok(self.docs.lock().unwrap().get(&store_id).cloned())
    }

    async fn delete_document(&self, store_id: StoreId) -> Result<(), SearchIndexError> {
        if self.writes_failing() {
            return Err(SearchIndexError::delete("index unavailable"));
        }
        self.docs.lock().unwrap().remove(&store_id);
        Ok(())
    }

    async fn delete_all_documents(&self) -> Result<u64, SearchIndexError> {
        if self.fail_delete_all.load(Ordering::SeqCst) {
            return Err(SearchIndexError::delete("delete by query failed"));
        }
        let mut docs = self.docs.lock().unwrap();
        let removed = docs.len() as u64;
        docs.clear();
        Ok(removed)
    }

    async fn count_documents(&self) -> Result<u64, SearchIndexError> {
        Ok(self.docs.lock().unwrap().len() as u64)
    }

    async fn search(&self, _query: &Value) -> Result<Vec<SearchHit>, SearchError> {
        Ok(Vec::new())
    }

    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}

/// Embedding provider returning constant vectors.
pub struct MockEmbedder {
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    max_vectors: Option<usize>,
    fail: bool,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            single_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            max_vectors: None,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Batch calls return at most `n` vectors.
    pub fn returning_at_most(n: usize) -> Self {
        Self {
            max_vectors: Some(n),
            ..Self::new()
        }
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::request("connection refused"));
        }
        Ok(vec![0.1; DIMS])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::request("connection refused"));
        }
        let n = self.max_vectors.map_or(texts.len(), |max| max.min(texts.len()));
        Ok(vec![vec![0.1; DIMS]; n])
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Increments a counter when the stream holding it is dropped.
struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// System-of-record serving a fixed list of rows.
pub struct MockSource {
    rows: Vec<Result<StoreRecord, SourceError>>,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
    unavailable: bool,
}

impl MockSource {
    pub fn new(rows: Vec<Result<StoreRecord, SourceError>>) -> Self {
        Self {
            rows,
            opened: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
            unavailable: false,
        }
    }

    /// Active stores with ids `1..=n`.
    pub fn with_stores(n: StoreId) -> Self {
        Self::new((1..=n).map(|id| Ok(store(id))).collect())
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn records(&self) -> impl Iterator<Item = &StoreRecord> {
        self.rows.iter().filter_map(|row| row.as_ref().ok())
    }
}

#[async_trait]
impl StoreSource for MockSource {
    async fn stream_active(&self) -> Result<StoreStream<'_>, SourceError> {
        if self.unavailable {
            return Err(SourceError::unavailable("connection refused"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);

        let guard = ReleaseGuard(self.released.clone());
        let rows: Vec<_> = self
            .rows
            .iter()
            .filter(|row| !matches!(row, Ok(record) if record.is_deleted()))
            .cloned()
            .collect();

        Ok(stream::iter(rows)
            .map(move |row| {
                let _held = &guard;
                row
            })
            .boxed())
    }

    async fn find_by_id(&self, store_id: StoreId) -> Result<Option<StoreRecord>, SourceError> {
        Ok(self.records().find(|r| r.id == store_id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner_id: i64,
        before_id: Option<StoreId>,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, SourceError> {
        let mut rows: Vec<StoreRecord> = self
            .records()
            .filter(|r| r.owner_id == owner_id && !r.is_deleted())
            .filter(|r| before_id.map_or(true, |before| r.id < before))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn count_active(&self) -> Result<u64, SourceError> {
        Ok(self.records().filter(|r| !r.is_deleted()).count() as u64)
    }
}
