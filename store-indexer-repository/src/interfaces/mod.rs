//! Interface definitions for the external systems.
//!
//! These traits allow for dependency injection of the search index backend
//! and of the system-of-record, so the sync and query layers can be tested
//! with in-memory implementations.

mod search_index_provider;
mod store_source;

pub use search_index_provider::SearchIndexProvider;
pub use store_source::{StoreSource, StoreStream};
