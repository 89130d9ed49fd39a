//! Configuration types for the search index client.

use std::time::Duration;

/// Default per-request timeout for index operations.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the search index client.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum number of documents allowed in a single bulk operation.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
    /// Timeout applied by the transport to every request.
    pub request_timeout: Duration,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with no batch size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check a bulk request size against the configured limit.
    ///
    /// Returns the limit that was exceeded, if any.
    pub fn exceeded_limit(&self, size: usize) -> Option<usize> {
        self.max_batch_size.filter(|max| size > *max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        let config = SearchIndexConfig::default();
        assert_eq!(config.exceeded_limit(1000), None);
        assert_eq!(config.exceeded_limit(1001), Some(1000));
    }

    #[test]
    fn test_unlimited() {
        let config = SearchIndexConfig::unlimited();
        assert_eq!(config.exceeded_limit(1_000_000), None);
    }

    #[test]
    fn test_custom_limit_and_timeout() {
        let config = SearchIndexConfig::with_max_batch_size(5)
            .with_request_timeout(Duration::from_secs(2));
        assert_eq!(config.exceeded_limit(10), Some(5));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }
}
