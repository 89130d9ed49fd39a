//! Results of reindex and consistency operations.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// Summary of a successful reindex run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReindexReport {
    /// Correlates the run's log lines.
    pub run_id: Uuid,
    pub batches: usize,
    pub indexed: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl fmt::Display for ReindexReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reindexed {} store(s) in {} batch(es) in {:.2}s (run {})",
            self.indexed,
            self.batches,
            self.elapsed.as_secs_f64(),
            self.run_id
        )
    }
}

/// Store counts on both sides of the sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConsistency {
    /// Active stores in the system-of-record.
    pub source_count: u64,
    /// Documents in the search index.
    pub index_count: u64,
}

impl IndexConsistency {
    pub fn is_in_sync(&self) -> bool {
        self.source_count == self.index_count
    }
}

impl fmt::Display for IndexConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_in_sync() { "in sync" } else { "out of sync" };
        write!(
            f,
            "{}: {} active store(s), {} indexed document(s)",
            state, self.source_count, self.index_count
        )
    }
}

/// What `reindex_if_out_of_sync` did.
#[derive(Debug, Clone, PartialEq)]
pub enum StaleCheckOutcome {
    /// Counts matched; nothing was done.
    InSync(IndexConsistency),
    /// Counts differed and a reindex ran.
    Reindexed {
        before: IndexConsistency,
        report: ReindexReport,
    },
}
