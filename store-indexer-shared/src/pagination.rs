//! Keyset pagination.
//!
//! Pages are ordered by store id descending. The first page has no cursor;
//! every following page asks for ids strictly lower than the last id seen.
//! Nothing depends on row position, so inserts and deletes between requests
//! never shift or duplicate rows.

use serde::{Deserialize, Serialize};

use crate::store::StoreId;

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Position of a keyset page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Last id of the previous page, `None` for the first page.
    pub last_id: Option<StoreId>,
    /// Number of items requested.
    pub page_size: usize,
}

impl Cursor {
    /// Build a cursor from optional request parameters.
    ///
    /// A missing size falls back to `DEFAULT_PAGE_SIZE`; sizes are clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(last_id: Option<StoreId>, page_size: Option<usize>) -> Self {
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Self { last_id, page_size }
    }

    /// Cursor for the first page.
    pub fn first(page_size: usize) -> Self {
        Self::new(None, Some(page_size))
    }

    /// Cursor for the page following `last_id`.
    pub fn after(last_id: StoreId, page_size: usize) -> Self {
        Self::new(Some(last_id), Some(page_size))
    }

    /// Whether this cursor points at the first page.
    pub fn is_first(&self) -> bool {
        self.last_id.is_none()
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Items that can be paged by their store id.
pub trait KeysetItem {
    fn keyset_id(&self) -> StoreId;
}

/// One page of keyset-paginated results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Id to pass as `last_id` for the next page, present only if `has_next`.
    pub next_cursor: Option<StoreId>,
    pub has_next: bool,
}

impl<T: KeysetItem> Page<T> {
    /// Wrap the items fetched for `cursor`.
    ///
    /// A page is considered full, and therefore followed by another one, when
    /// it returned at least as many items as were requested.
    pub fn from_items(items: Vec<T>, cursor: &Cursor) -> Self {
        let has_next = !items.is_empty() && items.len() >= cursor.page_size;
        let next_cursor = if has_next {
            items.last().map(KeysetItem::keyset_id)
        } else {
            None
        };

        Self {
            items,
            next_cursor,
            has_next,
        }
    }
}

impl<T> Page<T> {
    /// An empty final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_next: false,
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursor for the following page, if there is one.
    pub fn next(&self, page_size: usize) -> Option<Cursor> {
        self.next_cursor.map(|id| Cursor::after(id, page_size))
    }
}
