use async_trait::async_trait;
use common::core::fastembed_embedding::{Embeddings, FastembedEmbeddingsService};
use common::helper::error_chain_fmt;

/// Encodes a user query into the vector space of the collection.
#[async_trait]
pub trait QueryEncoderPort: Send + Sync {
    async fn encode(&self, query: &str) -> Result<Embeddings, QueryEncoderPortError>;
}

#[derive(thiserror::Error)]
pub enum QueryEncoderPortError {
    #[error("Failed to encode the query: {0}")]
    EncodingError(String),
}

impl std::fmt::Debug for QueryEncoderPortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
impl QueryEncoderPort for FastembedEmbeddingsService {
    async fn encode(&self, query: &str) -> Result<Embeddings, QueryEncoderPortError> {
        let mut embeddings = self
            .generate_embeddings(vec![query.to_string()])
            .await
            .map_err(|error| QueryEncoderPortError::EncodingError(error.to_string()))?;

        embeddings.pop().ok_or_else(|| {
            QueryEncoderPortError::EncodingError(
                "the embeddings service returned no vector".to_string(),
            )
        })
    }
}
