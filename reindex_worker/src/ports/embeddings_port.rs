use async_trait::async_trait;
use common::core::fastembed_embedding::{Embeddings, FastembedEmbeddingsService};
use common::helper::error_chain_fmt;

/// Computes embeddings for batches of texts.
#[async_trait]
pub trait EmbeddingsPort: Send + Sync {
    /// Returns one embedding per input text, preserving order.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embeddings>, EmbeddingsPortError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingsPortError {
    #[error("Failed to compute embeddings: {0}")]
    EmbeddingsError(String),
}

impl std::fmt::Debug for EmbeddingsPortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
impl EmbeddingsPort for FastembedEmbeddingsService {
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embeddings>, EmbeddingsPortError> {
        self.generate_embeddings(texts)
            .await
            .map_err(|error| EmbeddingsPortError::EmbeddingsError(error.to_string()))
    }
}
