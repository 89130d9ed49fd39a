//! # Store Indexer Shared
//!
//! Types shared by every crate of the store search indexer: the
//! system-of-record `StoreRecord`, its search mirror `StoreDocument`, the
//! response shapes returned by search, keyset pagination and the ranking
//! strategy table.

pub mod document;
pub mod pagination;
pub mod ranking;
pub mod results;
pub mod store;

pub use document::{document_id, GeoPoint, StoreDocument, DEFAULT_EMBEDDING_DIMENSIONS};
pub use pagination::{Cursor, KeysetItem, Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use ranking::{HybridWeights, MatchKind, RankingStrategy};
pub use results::{StoreMapResult, StoreSearchResult, StoreSuggestion, StoreSummary};
pub use store::{StoreCategory, StoreId, StoreRecord};
