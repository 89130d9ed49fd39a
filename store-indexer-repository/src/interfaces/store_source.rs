//! System-of-record trait definition.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::SourceError;
use store_indexer_shared::{StoreId, StoreRecord};

/// A lazily read sequence of active store rows.
///
/// Row-level failures are yielded as items so the consumer can count them
/// and keep going. Dropping the stream releases the underlying cursor or file.
pub type StoreStream<'a> = BoxStream<'a, Result<StoreRecord, SourceError>>;

/// Read access to the system-of-record that owns store rows.
#[async_trait]
pub trait StoreSource: Send + Sync {
    /// Open a stream over every store that is not soft-deleted.
    ///
    /// The stream is bounded in memory regardless of the number of rows.
    ///
    /// # Returns
    ///
    /// * `Ok(StoreStream)` - The opened stream
    /// * `Err(SourceError)` - If the source could not be opened at all
    async fn stream_active(&self) -> Result<StoreStream<'_>, SourceError>;

    /// Look up a single store by id, including soft-deleted rows.
    async fn find_by_id(&self, store_id: StoreId) -> Result<Option<StoreRecord>, SourceError>;

    /// List an owner's active stores ordered by id descending.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - The owner whose stores are listed
    /// * `before_id` - Only ids strictly lower than this are returned, `None` for the first page
    /// * `limit` - Maximum number of rows
    async fn find_by_owner(
        &self,
        owner_id: i64,
        before_id: Option<StoreId>,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, SourceError>;

    /// Count stores that are not soft-deleted.
    async fn count_active(&self) -> Result<u64, SourceError>;
}
