//! Keyset-paginated owner listings.

use std::sync::Arc;

use tracing::{debug, instrument};

use store_indexer_repository::{SourceError, StoreSource};
use store_indexer_shared::{Cursor, Page, StoreSummary};

/// Serves an owner's stores page by page, newest id first.
pub struct Paginator {
    source: Arc<dyn StoreSource>,
}

impl Paginator {
    pub fn new(source: Arc<dyn StoreSource>) -> Self {
        Self { source }
    }

    /// Fetch one page of an owner's active stores.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - The owner whose stores are listed
    /// * `cursor` - Page position; the first page has no `last_id`
    ///
    /// # Returns
    ///
    /// * `Ok(Page<StoreSummary>)` - The page, with `next_cursor` set when it was full
    /// * `Err(SourceError)` - If the system-of-record could not be read
    #[instrument(skip(self), fields(last_id = ?cursor.last_id, page_size = cursor.page_size))]
    pub async fn owner_stores(
        &self,
        owner_id: i64,
        cursor: &Cursor,
    ) -> Result<Page<StoreSummary>, SourceError> {
        let rows = self
            .source
            .find_by_owner(owner_id, cursor.last_id, cursor.page_size)
            .await?;

        let items: Vec<StoreSummary> = rows.iter().map(StoreSummary::from).collect();
        let page = Page::from_items(items, cursor);
        debug!(
            owner_id = owner_id,
            items = page.len(),
            has_next = page.has_next,
            "Fetched owner stores page"
        );
        Ok(page)
    }
}
