//! Embedding client configuration.

use std::time::Duration;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Default output dimensionality of `DEFAULT_MODEL`.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Configuration for the OpenAI-compatible embedding client.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Base URL; `/embeddings` is appended.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
    pub model: String,
    /// Requested output dimensionality.
    pub dimensions: usize,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl EmbeddingConfig {
    /// Create a config with the default endpoint and model for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// The full embeddings endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/embeddings", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = EmbeddingConfig {
            api_url: "http://localhost:8080/v1/".to_string(),
            ..EmbeddingConfig::new("key")
        };
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(
            EmbeddingConfig::default().endpoint(),
            "https://api.openai.com/v1/embeddings"
        );
    }
}
