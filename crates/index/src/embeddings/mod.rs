//! Embedding generation for policy chunks and queries.
//!
//! The embedding function is a pluggable collaborator behind the
//! `EmbeddingProvider` trait. The lexical provider is deterministic and
//! fully offline; the Ollama provider calls a local embedding model.

pub mod providers;

pub use providers::{LexicalProvider, OllamaProvider};

use staffdesk_core::config::EmbeddingSettings;
use staffdesk_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "lexical", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Index("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from configuration.
pub fn create_provider(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "lexical" => Ok(Arc::new(LexicalProvider::new(settings.dimensions))),
        "ollama" => Ok(Arc::new(OllamaProvider::new(
            settings.endpoint.as_deref(),
            &settings.model,
            settings.dimensions,
        ))),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: lexical, ollama",
            other
        ))),
    }
}
