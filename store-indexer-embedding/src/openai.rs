//! OpenAI-compatible embedding client.
//!
//! Works with the OpenAI API and with any server exposing the same
//! `/embeddings` contract.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::client::EmbeddingClient;
use crate::config::EmbeddingConfig;
use crate::errors::EmbeddingError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Embedding client for OpenAI-compatible APIs.
pub struct OpenAiEmbeddingClient {
    client: Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbeddingClient {
    /// Create a new client.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenAiEmbeddingClient)` - A client ready to use
    /// * `Err(EmbeddingError::ConfigError)` - If the API key is missing or the HTTP client cannot be built
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        if config.api_key.trim().is_empty() {
            return Err(EmbeddingError::config("API key is required"));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EmbeddingError::config(e.to_string()))?;

        info!(model = %config.model, url = %config.api_url, "Embedding client initialized");

        Ok(Self { client, config })
    }

    /// Send one request for all `texts` and return the vectors in input order.
    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: Some(self.config.dimensions),
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_text, "Embedding API request failed");
            return Err(EmbeddingError::api(status.as_u16(), error_text));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::parse(e.to_string()))?;

        Ok(into_ordered_vectors(body))
    }
}

/// Sort response items by their `index` so vectors line up with the inputs.
fn into_ordered_vectors(response: EmbeddingResponse) -> Vec<Vec<f32>> {
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let vectors = self.request_embeddings(&[trimmed.to_string()]).await?;
        let embedding = vectors
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?;

        debug!(dimensions = embedding.len(), "Generated embedding");
        Ok(embedding)
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.request_embeddings(texts).await?;
        if vectors.is_empty() {
            return Err(EmbeddingError::EmptyResponse);
        }

        debug!(requested = texts.len(), returned = vectors.len(), "Generated embeddings");
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = OpenAiEmbeddingClient::new(EmbeddingConfig::default());
        assert!(matches!(result, Err(EmbeddingError::ConfigError(_))));
    }

    #[test]
    fn test_request_serialization() {
        let input = vec!["Corner Cafe".to_string()];
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &input,
            dimensions: Some(1536),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "text-embedding-3-small");
        assert_eq!(value["input"][0], "Corner Cafe");
        assert_eq!(value["dimensions"], 1536);
    }

    #[test]
    fn test_response_is_reordered_by_index() {
        let response: EmbeddingResponse = serde_json::from_value(json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [
                { "object": "embedding", "index": 1, "embedding": [0.2, 0.2] },
                { "object": "embedding", "index": 0, "embedding": [0.1, 0.1] }
            ],
            "usage": { "prompt_tokens": 4, "total_tokens": 4 }
        }))
        .unwrap();

        let vectors = into_ordered_vectors(response);
        assert_eq!(vectors, vec![vec![0.1, 0.1], vec![0.2, 0.2]]);
    }

    #[tokio::test]
    async fn test_blank_text_is_not_sent() {
        let client = OpenAiEmbeddingClient::new(EmbeddingConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            ..EmbeddingConfig::new("key")
        })
        .unwrap();

        let result = client.embed("   ").await;
        assert!(matches!(result, Err(EmbeddingError::EmptyInput)));

        let batch = client.embed_batch(&[]).await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(client.dimensions(), 1536);
    }
}
