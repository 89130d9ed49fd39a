//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings, analyzers and mappings for the
//! store search index.

use serde_json::{json, Value};

use store_indexer_shared::DEFAULT_EMBEDDING_DIMENSIONS;

/// Default alias the index is reachable under.
pub const DEFAULT_INDEX_ALIAS: &str = "stores";

/// Configuration of the physical index behind the alias.
///
/// The physical index is named `{alias}_v{version}` so that a new mapping
/// can be built next to the old one and the alias swapped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Alias used for every read and write.
    pub alias: String,
    /// Version suffix of the physical index.
    pub version: u32,
    /// Number of primary shards.
    pub shards: u32,
    /// Number of replicas per shard.
    pub replicas: u32,
    /// Length of the `embedding` vector field.
    pub embedding_dimensions: usize,
}

impl IndexConfig {
    /// Create a config with the default layout for the given alias and version.
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
            ..Self::default()
        }
    }

    /// Name of the physical index.
    pub fn index_name(&self) -> String {
        format!("{}_v{}", self.alias, self.version)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            alias: DEFAULT_INDEX_ALIAS.to_string(),
            version: 1,
            shards: 3,
            replicas: 1,
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

/// Get the index creation body for the store search index.
///
/// The configuration includes:
/// - **autocomplete**: edge n-grams (1..20) on `name.autocomplete`, searched with a plain analyzer
/// - **ngram**: 2..3 character n-grams on `name.ngram` for infix matches
/// - **keyword**: untokenized `name.keyword` for exact matches
/// - **geo_point**: `location` for distance filters and sorts
/// - **knn_vector**: `embedding` for cosine similarity scripts
///
/// The alias is attached in the same request so it exists as soon as the index does.
pub fn get_index_settings(config: &IndexConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": config.shards,
            "number_of_replicas": config.replicas,
            "refresh_interval": "1s",
            "index": {
                "knn": true,
                "max_ngram_diff": 18
            },
            "analysis": {
                "tokenizer": {
                    "autocomplete_tokenizer": {
                        "type": "edge_ngram",
                        "min_gram": 1,
                        "max_gram": 20,
                        "token_chars": ["letter", "digit"]
                    },
                    "ngram_tokenizer": {
                        "type": "ngram",
                        "min_gram": 2,
                        "max_gram": 3,
                        "token_chars": ["letter", "digit"]
                    }
                },
                "analyzer": {
                    "autocomplete_analyzer": {
                        "type": "custom",
                        "tokenizer": "autocomplete_tokenizer",
                        "filter": ["lowercase"]
                    },
                    "autocomplete_search_analyzer": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase"]
                    },
                    "ngram_analyzer": {
                        "type": "custom",
                        "tokenizer": "ngram_tokenizer",
                        "filter": ["lowercase"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "store_id": { "type": "long" },
                "owner_id": { "type": "long" },
                "owner_name": { "type": "keyword" },
                "name": {
                    "type": "text",
                    "fields": {
                        "keyword": { "type": "keyword" },
                        "autocomplete": {
                            "type": "text",
                            "analyzer": "autocomplete_analyzer",
                            "search_analyzer": "autocomplete_search_analyzer"
                        },
                        "ngram": {
                            "type": "text",
                            "analyzer": "ngram_analyzer"
                        }
                    }
                },
                "phone": { "type": "keyword" },
                "description": { "type": "text" },
                "business_number": { "type": "keyword" },
                "address": { "type": "text" },
                "neighborhood": { "type": "keyword" },
                "location": { "type": "geo_point" },
                "image_url": { "type": "keyword", "index": false },
                "category": { "type": "keyword" },
                "weekday_open_time": { "type": "keyword" },
                "weekday_close_time": { "type": "keyword" },
                "weekend_open_time": { "type": "keyword" },
                "weekend_close_time": { "type": "keyword" },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" },
                "embedding": {
                    "type": "knn_vector",
                    "dimension": config.embedding_dimensions
                }
            }
        },
        "aliases": {
            config.alias.clone(): {}
        }
    })
}
