//! Embedding client trait definition.

use async_trait::async_trait;

use crate::errors::EmbeddingError;

/// Converts text into fixed-dimension float vectors.
///
/// Implementations are injected into the sync coordinator and the search
/// engine, which lets tests replace the network provider with a mock.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a single text.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to embed; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<f32>)` - The embedding vector
    /// * `Err(EmbeddingError::EmptyInput)` - If the text is blank
    /// * `Err(EmbeddingError)` - If the provider call fails
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts with a single provider call.
    ///
    /// Vectors are returned in input order. The provider may return fewer
    /// vectors than texts; callers must pair positionally and treat the
    /// missing tail as absent.
    ///
    /// # Arguments
    ///
    /// * `texts` - The texts to embed
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Vec<f32>>)` - One vector per text, possibly short
    /// * `Err(EmbeddingError)` - If the provider call fails
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Dimensionality of the vectors this client produces.
    fn dimensions(&self) -> usize;
}
