use async_trait::async_trait;
use common::core::qdrant_point::{
    identifier_from_point_id, json_map_from_payload, payload_from_json_map, PointIdentifier,
};
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{PointId, PointStruct, RetrievedPoint, ScrollPoints},
};
use tracing::warn;

use crate::domain::entities::stored_point::{PointUpdate, RawPointRecord};
use crate::ports::point_store_port::{PointStorePort, PointStorePortError, ScrolledPage};

/// [`PointStorePort`] adapter over one Qdrant collection.
pub struct PointQdrantRepository {
    client: QdrantClient,
    collection_name: String,
}

impl PointQdrantRepository {
    pub fn new(client: QdrantClient, collection_name: &str) -> Self {
        Self {
            client,
            collection_name: collection_name.to_string(),
        }
    }
}

#[async_trait]
impl PointStorePort for PointQdrantRepository {
    #[tracing::instrument(name = "Scrolling points from Qdrant", skip(self))]
    async fn scroll_page(
        &self,
        offset: Option<PointIdentifier>,
        page_size: u32,
    ) -> Result<ScrolledPage, PointStorePortError> {
        let request = ScrollPoints {
            collection_name: self.collection_name.clone(),
            offset: offset.as_ref().map(PointId::from),
            limit: Some(page_size),
            with_payload: Some(true.into()),
            ..Default::default()
        };

        let response = match self.client.scroll(&request).await {
            Ok(response) => response,
            Err(error) => {
                // Some deployments reject the paged call shape. One retry
                // with the minimal shape, keeping the offset and payloads.
                warn!(
                    ?error,
                    "Scroll call failed, retrying with a simplified call shape"
                );
                let request = ScrollPoints {
                    collection_name: self.collection_name.clone(),
                    offset: offset.as_ref().map(PointId::from),
                    with_payload: Some(true.into()),
                    ..Default::default()
                };
                self.client
                    .scroll(&request)
                    .await
                    .map_err(|error| PointStorePortError::StoreError(error.to_string()))?
            }
        };

        Ok(ScrolledPage {
            records: response
                .result
                .into_iter()
                .map(RawPointRecord::from)
                .collect(),
            next_offset: response
                .next_page_offset
                .as_ref()
                .and_then(identifier_from_point_id),
        })
    }

    #[tracing::instrument(
        name = "Upserting points to Qdrant",
        skip(self, points),
        fields(nb_points = points.len())
    )]
    async fn upsert_batch(&self, points: Vec<PointUpdate>) -> Result<(), PointStorePortError> {
        self.client
            .upsert_points(
                &self.collection_name,
                points.into_iter().map(PointStruct::from).collect(),
                None,
            )
            .await
            .map_err(|error| PointStorePortError::StoreError(error.to_string()))?;

        Ok(())
    }
}

impl From<RetrievedPoint> for RawPointRecord {
    fn from(point: RetrievedPoint) -> Self {
        RawPointRecord::Typed {
            id: point.id.as_ref().and_then(identifier_from_point_id),
            payload: json_map_from_payload(&point.payload),
        }
    }
}

impl From<PointUpdate> for PointStruct {
    fn from(update: PointUpdate) -> Self {
        Self {
            // A missing identifier is passed through: the store rejects the
            // batch and the run aborts there.
            id: update.id.as_ref().map(PointId::from),
            vectors: Some(update.vector.into()),
            payload: payload_from_json_map(&update.payload),
        }
    }
}
