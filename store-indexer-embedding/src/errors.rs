//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while generating embeddings.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// The input text was blank.
    #[error("Empty input text")]
    EmptyInput,

    /// The HTTP request could not be sent or timed out.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The provider answered with a non-success status.
    #[error("Embedding API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// The provider answered with no vectors.
    #[error("Empty response from embedding API")]
    EmptyResponse,

    /// The response body could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The client is misconfigured (e.g., missing API key).
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EmbeddingError {
    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create an API error.
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: msg.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
