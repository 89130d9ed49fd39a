//! Error types for the store indexer repository.

mod search_error;
mod search_index_error;
mod source_error;

pub use search_error::SearchError;
pub use search_index_error::SearchIndexError;
pub use source_error::SourceError;
