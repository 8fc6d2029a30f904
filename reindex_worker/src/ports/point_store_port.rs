use async_trait::async_trait;
use common::core::qdrant_point::PointIdentifier;
use common::helper::error_chain_fmt;

use crate::domain::entities::stored_point::{PointUpdate, RawPointRecord};

/// One page of a collection scan.
#[derive(Debug)]
pub struct ScrolledPage {
    pub records: Vec<RawPointRecord>,
    /// Offset to request the next page with, `None` once the collection is
    /// exhausted.
    pub next_offset: Option<PointIdentifier>,
}

/// Read/write access to the points of one collection.
#[async_trait]
pub trait PointStorePort: Send + Sync {
    /// Fetches one page of points with their payloads, starting at `offset`
    /// (`None` for the first page).
    async fn scroll_page(
        &self,
        offset: Option<PointIdentifier>,
        page_size: u32,
    ) -> Result<ScrolledPage, PointStorePortError>;

    /// Writes a batch of point updates. Payloads are stored as given.
    async fn upsert_batch(&self, points: Vec<PointUpdate>) -> Result<(), PointStorePortError>;
}

#[derive(thiserror::Error)]
pub enum PointStorePortError {
    #[error("Error from the vector store: {0}")]
    StoreError(String),
}

impl std::fmt::Debug for PointStorePortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
