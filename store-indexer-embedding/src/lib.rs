//! # Store Indexer Embedding
//!
//! Turns text into fixed-dimension float vectors. The `EmbeddingClient`
//! trait is what the sync and query layers consume; `OpenAiEmbeddingClient`
//! implements it against any OpenAI-compatible `/embeddings` endpoint, and
//! `DisabledEmbeddingClient` stands in when no API key is configured.

mod client;
mod config;
mod disabled;
mod errors;
mod openai;

pub use client::EmbeddingClient;
pub use config::EmbeddingConfig;
pub use disabled::DisabledEmbeddingClient;
pub use errors::EmbeddingError;
pub use openai::OpenAiEmbeddingClient;
