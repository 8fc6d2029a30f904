use async_trait::async_trait;
use common::core::fastembed_embedding::Embeddings;
use common::core::qdrant_point::PointIdentifier;
use common::helper::error_chain_fmt;

use crate::domain::entities::retrieved_node::RetrievedNode;

/// Read access to the points of the vector store, mirroring the two-step
/// retrieval: a nearest-neighbor search for identifiers, then a fetch of the
/// matching content nodes.
#[async_trait]
pub trait PointSearchPort: Send + Sync {
    /// Returns the identifiers of the `limit` nearest points, best first.
    async fn search_nearest(
        &self,
        collection_name: &str,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<PointIdentifier>, PointSearchPortError>;

    /// Fetches the content nodes of the given points, preserving the
    /// requested order.
    async fn get_nodes(
        &self,
        collection_name: &str,
        ids: &[PointIdentifier],
    ) -> Result<Vec<RetrievedNode>, PointSearchPortError>;
}

#[derive(thiserror::Error)]
pub enum PointSearchPortError {
    #[error("Error from the vector store: {0}")]
    StoreError(String),
}

impl std::fmt::Debug for PointSearchPortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
