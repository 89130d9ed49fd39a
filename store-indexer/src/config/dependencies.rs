//! Dependency initialization and wiring for the store indexer.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::IndexerConfig;
use crate::IndexingError;
use store_indexer_embedding::{
    DisabledEmbeddingClient, EmbeddingClient, EmbeddingConfig, OpenAiEmbeddingClient,
};
use store_indexer_pipeline::{ReindexPipeline, SyncCoordinator};
use store_indexer_query::{Paginator, SearchEngine};
use store_indexer_repository::{
    JsonlStoreSource, OpenSearchClient, SearchIndexProvider, StoreSource,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The search index every component writes to and reads from.
    pub index: Arc<dyn SearchIndexProvider>,
    /// The system-of-record.
    pub source: Arc<dyn StoreSource>,
    pub sync: Arc<SyncCoordinator>,
    pub pipeline: ReindexPipeline,
    pub search: SearchEngine,
    pub paginator: Paginator,
}

impl Dependencies {
    /// Initialize all dependencies from a loaded configuration.
    ///
    /// The OpenSearch cluster must be reachable and healthy. Without an
    /// embedding API key, embedding is disabled rather than fatal.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new(config: &IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %config.opensearch_url,
            index = %config.index.index_name(),
            export_path = %config.export_path.display(),
            embedding_model = %config.embedding.model,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(
            &config.opensearch_url,
            config.index.clone(),
            config.search_index.clone(),
        )
        .await
        .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let embedder = build_embedder(&config.embedding)?;

        let index: Arc<dyn SearchIndexProvider> = Arc::new(search_client);
        let source: Arc<dyn StoreSource> =
            Arc::new(JsonlStoreSource::new(config.export_path.clone()));

        let sync = Arc::new(SyncCoordinator::new(index.clone(), embedder.clone()));
        let pipeline = ReindexPipeline::with_config(
            source.clone(),
            index.clone(),
            sync.clone(),
            config.reindex.clone(),
        );
        let search = SearchEngine::new(index.clone(), embedder);
        let paginator = Paginator::new(source.clone());

        Ok(Self {
            index,
            source,
            sync,
            pipeline,
            search,
            paginator,
        })
    }
}

/// Build the embedding client, or a disabled one when no API key is set.
///
/// # Returns
///
/// * `Ok(Arc<dyn EmbeddingClient>)` - The configured or disabled client
/// * `Err(IndexingError)` - If a key is set but the client cannot be built
fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingClient>, IndexingError> {
    if config.api_key.trim().is_empty() {
        warn!("OPENAI_API_KEY is not set, embeddings are disabled");
        return Ok(Arc::new(DisabledEmbeddingClient::new(config.dimensions)));
    }

    let embedder = OpenAiEmbeddingClient::new(config.clone()).map_err(|e| {
        IndexingError::config(format!("Failed to create embedding client: {}", e))
    })?;

    info!(dimensions = embedder.dimensions(), "Embedding client created");
    Ok(Arc::new(embedder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_indexer_embedding::EmbeddingError;

    #[tokio::test]
    async fn test_missing_api_key_disables_embedding() {
        let config = EmbeddingConfig {
            dimensions: 64,
            ..EmbeddingConfig::default()
        };

        let embedder = build_embedder(&config).unwrap();

        assert_eq!(embedder.dimensions(), 64);
        assert!(matches!(
            embedder.embed("cafe").await,
            Err(EmbeddingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_api_key_builds_provider_client() {
        let embedder = build_embedder(&EmbeddingConfig::new("sk-test")).unwrap();

        assert_eq!(embedder.dimensions(), EmbeddingConfig::default().dimensions);
    }
}
