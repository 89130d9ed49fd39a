//! Request and response types for search index operations.

use serde_json::Value;

use crate::errors::SearchIndexError;
use store_indexer_shared::{StoreDocument, StoreId};

/// A single hit returned by a search query.
///
/// The engine-side score and sort values are kept next to the parsed
/// document so callers can rank or measure distance without re-querying.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The parsed `_source` of the hit.
    pub document: StoreDocument,
    /// Relevance score, absent when the query sorts on something else.
    pub score: Option<f32>,
    /// Raw sort values in the order the query declared its sorts.
    pub sort: Vec<Value>,
}

impl SearchHit {
    /// Create a hit with a score and no sort values.
    pub fn scored(document: StoreDocument, score: f32) -> Self {
        Self {
            document,
            score: Some(score),
            sort: Vec::new(),
        }
    }

    /// The first sort value as a number, if present.
    ///
    /// Geo distance queries put the distance in kilometers here.
    pub fn first_sort_f64(&self) -> Option<f64> {
        self.sort.first().and_then(Value::as_f64)
    }
}

/// Result of a batch operation for a single item.
///
/// This struct represents the outcome of a single operation within a batch. It
/// indicates whether the operation succeeded and includes error details if it
/// failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The store the operation was for.
    pub store_id: StoreId,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This struct provides a complete overview of a bulk operation, including the total
/// number of items processed, how many succeeded and failed, and detailed results for
/// each individual item. This allows callers to handle partial failures gracefully.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-item results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Ids of the stores whose operation failed.
    pub fn failed_ids(&self) -> Vec<StoreId> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.store_id)
            .collect()
    }
}
