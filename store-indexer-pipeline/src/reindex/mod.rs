//! Streaming full reindex of the system-of-record into the search index.
//!
//! The source stream is read once, cut into fixed-size batches and each batch
//! is embedded and written before the next row is pulled. Batches never
//! overlap, so load on the embedding provider and the index stays bounded
//! and every failure belongs to exactly one batch.

mod report;

pub use report::{IndexConsistency, ReindexReport, StaleCheckOutcome};

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::sync::SyncCoordinator;
use store_indexer_repository::{SearchIndexProvider, StoreSource};
use store_indexer_shared::StoreRecord;

/// Configuration for the reindex pipeline.
#[derive(Debug, Clone)]
pub struct ReindexConfig {
    /// Number of stores embedded and written per batch.
    pub batch_size: usize,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Running totals of one reindex run.
#[derive(Debug, Default)]
struct Progress {
    batches: usize,
    indexed: usize,
    failed: usize,
}

/// Rebuilds the search index from the system-of-record.
///
/// Concurrent runs are not coordinated against each other or against live
/// single-item syncs; operators must not start two at once.
pub struct ReindexPipeline {
    source: Arc<dyn StoreSource>,
    index: Arc<dyn SearchIndexProvider>,
    sync: Arc<SyncCoordinator>,
    config: ReindexConfig,
}

impl ReindexPipeline {
    /// Create a new pipeline with the default configuration.
    pub fn new(
        source: Arc<dyn StoreSource>,
        index: Arc<dyn SearchIndexProvider>,
        sync: Arc<SyncCoordinator>,
    ) -> Self {
        Self::with_config(source, index, sync, ReindexConfig::default())
    }

    /// Create a new pipeline with custom configuration.
    ///
    /// A batch size of zero is raised to one.
    pub fn with_config(
        source: Arc<dyn StoreSource>,
        index: Arc<dyn SearchIndexProvider>,
        sync: Arc<SyncCoordinator>,
        config: ReindexConfig,
    ) -> Self {
        let config = ReindexConfig {
            batch_size: config.batch_size.max(1),
        };
        Self {
            source,
            index,
            sync,
            config,
        }
    }

    /// Reindex every active store.
    ///
    /// A failed batch is counted and the run moves on to the next one. Rows
    /// the source cannot decode are counted as failures too. Once the stream
    /// is exhausted, the run fails if anything failed, so the operator is
    /// alerted even though the remaining work was done.
    ///
    /// # Returns
    ///
    /// * `Ok(ReindexReport)` - Every store was indexed
    /// * `Err(PipelineError::ReindexFailed)` - The run completed with failures
    /// * `Err(PipelineError::SourceError)` - The source could not be opened or read
    #[instrument(skip(self), fields(batch_size = self.config.batch_size))]
    pub async fn reindex_all(&self) -> Result<ReindexReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(run_id = %run_id, "Starting reindex of all stores");

        let progress = self.stream_batches().await.map_err(|e| {
            error!(run_id = %run_id, error = %e, "Reindex aborted");
            e
        })?;

        let report = ReindexReport {
            run_id,
            batches: progress.batches,
            indexed: progress.indexed,
            failed: progress.failed,
            elapsed: started.elapsed(),
        };

        if report.failed > 0 {
            error!(
                run_id = %run_id,
                indexed = report.indexed,
                failed = report.failed,
                batches = report.batches,
                "Reindex completed with failures"
            );
            return Err(PipelineError::reindex_failed(report.failed, report.indexed));
        }

        info!(
            run_id = %run_id,
            indexed = report.indexed,
            batches = report.batches,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Reindex completed"
        );
        Ok(report)
    }

    /// Delete every document from the index.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of documents removed
    /// * `Err(PipelineError::IndexDeletionError)` - If the deletion failed
    #[instrument(skip(self))]
    pub async fn delete_all_from_index(&self) -> Result<u64, PipelineError> {
        warn!("Deleting all stores from the search index");
        let deleted = self.index.delete_all_documents().await.map_err(|e| {
            error!(error = %e, "Failed to delete stores from the search index");
            PipelineError::index_deletion(e)
        })?;

        info!(deleted = deleted, "Deleted all stores from the search index");
        Ok(deleted)
    }

    /// Wipe the index, then reindex every active store.
    ///
    /// The reindex only starts once the deletion has succeeded.
    #[instrument(skip(self))]
    pub async fn full_reindex(&self) -> Result<ReindexReport, PipelineError> {
        info!("Starting full reindex (delete and rebuild)");
        self.delete_all_from_index().await?;
        let report = self.reindex_all().await?;
        info!(run_id = %report.run_id, "Full reindex completed");
        Ok(report)
    }

    /// Compare the number of active stores with the number of indexed documents.
    pub async fn check_consistency(&self) -> Result<IndexConsistency, PipelineError> {
        let source_count = self.source.count_active().await?;
        let index_count = self.index.count_documents().await?;

        let consistency = IndexConsistency {
            source_count,
            index_count,
        };
        info!(
            source_count = source_count,
            index_count = index_count,
            in_sync = consistency.is_in_sync(),
            "Checked index consistency"
        );
        Ok(consistency)
    }

    /// Reindex only if the index and the source disagree on the store count.
    ///
    /// Running it again right after a successful reindex is a no-op.
    #[instrument(skip(self))]
    pub async fn reindex_if_out_of_sync(&self) -> Result<StaleCheckOutcome, PipelineError> {
        let consistency = self.check_consistency().await?;
        if consistency.is_in_sync() {
            debug!("Index is in sync, skipping reindex");
            return Ok(StaleCheckOutcome::InSync(consistency));
        }

        warn!(
            source_count = consistency.source_count,
            index_count = consistency.index_count,
            "Index is out of sync, reindexing"
        );
        let report = self.reindex_all().await?;
        Ok(StaleCheckOutcome::Reindexed {
            before: consistency,
            report,
        })
    }

    /// Drain the source stream batch by batch.
    ///
    /// The stream is owned by this function and released when it returns,
    /// whichever way it returns.
    async fn stream_batches(&self) -> Result<Progress, PipelineError> {
        let mut stream = self.source.stream_active().await?;
        let mut progress = Progress::default();
        let mut batch: Vec<StoreRecord> = Vec::with_capacity(self.config.batch_size);

        while let Some(row) = stream.next().await {
            match row {
                Ok(store) => {
                    batch.push(store);
                    if batch.len() >= self.config.batch_size {
                        self.flush(&mut batch, &mut progress).await;
                    }
                }
                Err(e) if e.is_row_error() => {
                    warn!(error = %e, "Skipping store row that failed to decode");
                    progress.failed += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut progress).await;
        }

        Ok(progress)
    }

    /// Index the pending batch and record its outcome.
    async fn flush(&self, batch: &mut Vec<StoreRecord>, progress: &mut Progress) {
        let size = batch.len();
        progress.batches += 1;

        match self.sync.index_batch(batch).await {
            Ok(count) => {
                progress.indexed += count;
                debug!(
                    batch = progress.batches,
                    size = size,
                    total = progress.indexed,
                    "Processed batch"
                );
            }
            Err(e) => {
                progress.failed += size;
                error!(batch = progress.batches, size = size, error = %e, "Batch failed, continuing");
            }
        }

        batch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{store, MockEmbedder, MockIndex, MockSource};
    use store_indexer_repository::SourceError;
    use store_indexer_shared::StoreDocument;

    fn pipeline(
        source: &Arc<MockSource>,
        index: &Arc<MockIndex>,
        batch_size: usize,
    ) -> ReindexPipeline {
        let sync = Arc::new(SyncCoordinator::new(
            index.clone(),
            Arc::new(MockEmbedder::new()),
        ));
        ReindexPipeline::with_config(
            source.clone(),
            index.clone(),
            sync,
            ReindexConfig { batch_size },
        )
    }

    #[tokio::test]
    async fn test_reindex_all_batches_and_releases_stream() {
        let source = Arc::new(MockSource::with_stores(250));
        let index = Arc::new(MockIndex::new());

        let report = pipeline(&source, &index, 100).reindex_all().await.unwrap();

        assert_eq!(report.indexed, 250);
        assert_eq!(report.batches, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(index.bulk_sizes(), vec![100, 100, 50]);
        assert_eq!(index.count_documents().await.unwrap(), 250);
        assert_eq!(source.opened(), 1);
        assert_eq!(source.released(), 1);
    }

    #[tokio::test]
    async fn test_reindex_all_continues_after_failed_batch() {
        let source = Arc::new(MockSource::with_stores(30));
        let index = Arc::new(MockIndex::new());
        index.fail_bulk_call(2);

        let result = pipeline(&source, &index, 10).reindex_all().await;

        match result {
            Err(PipelineError::ReindexFailed { failed, indexed }) => {
                assert_eq!(failed, 10);
                assert_eq!(indexed, 20);
            }
            other => panic!("expected aggregate failure, got {:?}", other),
        }
        // The third batch still ran after the second failed
        assert_eq!(index.bulk_calls(), 3);
        assert_eq!(index.count_documents().await.unwrap(), 20);
        assert_eq!(source.released(), 1);
    }

    #[tokio::test]
    async fn test_reindex_all_counts_undecodable_rows() {
        let source = Arc::new(MockSource::new(vec![
            Ok(store(1)),
            Err(SourceError::decode(2, "missing field `name`")),
            Ok(store(3)),
        ]));
        let index = Arc::new(MockIndex::new());

        let result = pipeline(&source, &index, 100).reindex_all().await;

        assert!(matches!(
            result,
            Err(PipelineError::ReindexFailed { failed: 1, indexed: 2 })
        ));
    }

    #[tokio::test]
    async fn test_reindex_all_releases_stream_on_read_error() {
        let source = Arc::new(MockSource::new(vec![
            Ok(store(1)),
            Err(SourceError::read("connection reset")),
            Ok(store(3)),
        ]));
        let index = Arc::new(MockIndex::new());

        let result = pipeline(&source, &index, 100).reindex_all().await;

        assert!(matches!(result, Err(PipelineError::SourceError(_))));
        assert_eq!(source.opened(), 1);
        assert_eq!(source.released(), 1);
        assert_eq!(index.bulk_calls(), 0);
    }

    #[tokio::test]
    async fn test_reindex_all_fails_when_source_unavailable() {
        let source = Arc::new(MockSource::unavailable());
        let index = Arc::new(MockIndex::new());

        let result = pipeline(&source, &index, 100).reindex_all().await;

        assert!(matches!(result, Err(PipelineError::SourceError(_))));
    }

    #[tokio::test]
    async fn test_reindex_all_empty_source() {
        let source = Arc::new(MockSource::with_stores(0));
        let index = Arc::new(MockIndex::new());

        let report = pipeline(&source, &index, 100).reindex_all().await.unwrap();

        assert_eq!(report.indexed, 0);
        assert_eq!(report.batches, 0);
        assert_eq!(index.bulk_calls(), 0);
        assert_eq!(source.opened(), 1);
        assert_eq!(source.released(), 1);
    }

    #[tokio::test]
    async fn test_full_reindex_replaces_stale_documents() {
        let source = Arc::new(MockSource::with_stores(3));
        let index = Arc::new(MockIndex::new());
        index.insert(StoreDocument::from_record(&store(99), None, None));

        let report = pipeline(&source, &index, 2).full_reindex().await.unwrap();

        assert_eq!(report.indexed, 3);
        assert!(index.get_document(99).await.unwrap().is_none());
        assert_eq!(index.count_documents().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_full_reindex_stops_when_deletion_fails() {
        let source = Arc::new(MockSource::with_stores(3));
        let index = Arc::new(MockIndex::new());
        index.fail_delete_all();

        let result = pipeline(&source, &index, 2).full_reindex().await;

        assert!(matches!(result, Err(PipelineError::IndexDeletionError(_))));
        assert_eq!(source.opened(), 0);
    }

    #[tokio::test]
    async fn test_reindex_if_out_of_sync_is_idempotent() {
        let source = Arc::new(MockSource::with_stores(5));
        let index = Arc::new(MockIndex::new());
        let pipeline = pipeline(&source, &index, 2);

        let first = pipeline.reindex_if_out_of_sync().await.unwrap();
        assert!(matches!(first, StaleCheckOutcome::Reindexed { .. }));

        let second = pipeline.reindex_if_out_of_sync().await.unwrap();
        assert!(matches!(second, StaleCheckOutcome::InSync(_)));
        assert_eq!(source.opened(), 1);
    }
}
