//! Embedding client used when no provider is configured.

use async_trait::async_trait;

use crate::client::EmbeddingClient;
use crate::errors::EmbeddingError;

/// An `EmbeddingClient` that refuses every request.
///
/// Lets commands that never embed run without an API key. Sync falls back
/// to documents without vectors, semantic search returns nothing and hybrid
/// search falls back to keyword recommendation.
#[derive(Debug, Clone)]
pub struct DisabledEmbeddingClient {
    dimensions: usize,
}

impl DisabledEmbeddingClient {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn refuse() -> EmbeddingError {
        EmbeddingError::config("no embedding API key configured")
    }
}

#[async_trait]
impl EmbeddingClient for DisabledEmbeddingClient {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(Self::refuse())
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(Self::refuse())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_request_is_a_config_error() {
        let client = DisabledEmbeddingClient::new(256);

        assert_eq!(client.dimensions(), 256);
        assert!(matches!(
            client.embed("cafe").await,
            Err(EmbeddingError::ConfigError(_))
        ));
        assert!(matches!(
            client.embed_batch(&["cafe".to_string()]).await,
            Err(EmbeddingError::ConfigError(_))
        ));
    }
}
