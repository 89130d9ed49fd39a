//! Indexer settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::IndexingError;
use store_indexer_embedding::EmbeddingConfig;
use store_indexer_pipeline::ReindexConfig;
use store_indexer_repository::{IndexConfig, SearchIndexConfig};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default path of the system-of-record export.
const DEFAULT_EXPORT_PATH: &str = "stores.jsonl";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Everything the indexer needs to build its dependencies.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub opensearch_url: String,
    pub index: IndexConfig,
    pub search_index: SearchIndexConfig,
    pub embedding: EmbeddingConfig,
    pub reindex: ReindexConfig,
    /// JSON-lines export of the system-of-record.
    pub export_path: PathBuf,
    pub log_format: LogFormat,
}

impl IndexerConfig {
    /// Load the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `STORE_INDEX_ALIAS`: Index alias (default: stores)
    /// - `STORE_INDEX_VERSION`: Physical index version suffix (default: 1)
    /// - `STORE_INDEX_SHARDS`: Primary shards (default: 3)
    /// - `STORE_INDEX_REPLICAS`: Replicas per shard (default: 1)
    /// - `EMBEDDING_API_URL`: Embedding API base URL (default: https://api.openai.com/v1)
    /// - `OPENAI_API_KEY`: Embedding API key (embeddings are disabled when unset)
    /// - `EMBEDDING_MODEL`: Embedding model (default: text-embedding-3-small)
    /// - `EMBEDDING_DIMENSIONS`: Vector length (default: 1536)
    /// - `REQUEST_TIMEOUT_SECONDS`: Timeout for index and embedding requests (default: 30)
    /// - `REINDEX_BATCH_SIZE`: Stores per reindex batch (default: 100)
    /// - `STORE_EXPORT_PATH`: System-of-record export file (default: stores.jsonl)
    /// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
    ///
    /// # Returns
    ///
    /// * `Ok(IndexerConfig)` - The loaded configuration
    /// * `Err(IndexingError)` - If a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = IndexConfig::default();
        let embedding_defaults = EmbeddingConfig::default();

        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30u64)?);
        let dimensions = parse_or(
            &lookup,
            "EMBEDDING_DIMENSIONS",
            embedding_defaults.dimensions,
        )?;
        if dimensions == 0 {
            return Err(IndexingError::config("EMBEDDING_DIMENSIONS must be positive"));
        }

        let index = IndexConfig {
            alias: lookup("STORE_INDEX_ALIAS").unwrap_or(defaults.alias),
            version: parse_or(&lookup, "STORE_INDEX_VERSION", defaults.version)?,
            shards: parse_or(&lookup, "STORE_INDEX_SHARDS", defaults.shards)?,
            replicas: parse_or(&lookup, "STORE_INDEX_REPLICAS", defaults.replicas)?,
            embedding_dimensions: dimensions,
        };

        let embedding = EmbeddingConfig {
            api_url: lookup("EMBEDDING_API_URL").unwrap_or(embedding_defaults.api_url),
            api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            model: lookup("EMBEDDING_MODEL").unwrap_or(embedding_defaults.model),
            dimensions,
            request_timeout,
        };

        let reindex = ReindexConfig {
            batch_size: parse_or(
                &lookup,
                "REINDEX_BATCH_SIZE",
                ReindexConfig::default().batch_size,
            )?,
        };

        Ok(Self {
            opensearch_url: lookup("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index,
            search_index: SearchIndexConfig::default().with_request_timeout(request_timeout),
            embedding,
            reindex,
            export_path: lookup("STORE_EXPORT_PATH")
                .unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string())
                .into(),
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::default())?,
        })
    }
}

/// Parse a variable, falling back to `default` when it is unset or blank.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, IndexingError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {}='{}': {}", key, raw, e))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<IndexerConfig, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IndexerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.index.alias, "stores");
        assert_eq!(config.index.index_name(), "stores_v1");
        assert_eq!(config.index.shards, 3);
        assert_eq!(config.index.replicas, 1);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimensions, 1536);
        assert!(config.embedding.api_key.is_empty());
        assert_eq!(config.reindex.batch_size, 100);
        assert_eq!(config.export_path, PathBuf::from("stores.jsonl"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.search_index.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("OPENSEARCH_URL", "http://search:9200"),
            ("STORE_INDEX_ALIAS", "shops"),
            ("STORE_INDEX_VERSION", "4"),
            ("STORE_INDEX_REPLICAS", "0"),
            ("OPENAI_API_KEY", "sk-test"),
            ("EMBEDDING_DIMENSIONS", "256"),
            ("REQUEST_TIMEOUT_SECONDS", "5"),
            ("REINDEX_BATCH_SIZE", "500"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.opensearch_url, "http://search:9200");
        assert_eq!(config.index.index_name(), "shops_v4");
        assert_eq!(config.index.replicas, 0);
        assert_eq!(config.index.embedding_dimensions, 256);
        assert_eq!(config.embedding.dimensions, 256);
        assert_eq!(config.embedding.api_key, "sk-test");
        assert_eq!(config.embedding.request_timeout, Duration::from_secs(5));
        assert_eq!(config.search_index.request_timeout, Duration::from_secs(5));
        assert_eq!(config.reindex.batch_size, 500);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("REINDEX_BATCH_SIZE", "  ")]).unwrap();
        assert_eq!(config.reindex.batch_size, 100);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = load(&[("STORE_INDEX_SHARDS", "three")]).unwrap_err();
        assert!(err.to_string().contains("STORE_INDEX_SHARDS"));

        assert!(load(&[("EMBEDDING_DIMENSIONS", "0")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
