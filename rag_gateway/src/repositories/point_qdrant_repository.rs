use std::collections::HashMap;

use async_trait::async_trait;
use common::core::fastembed_embedding::Embeddings;
use common::core::point_payload::extract_text;
use common::core::qdrant_point::{identifier_from_point_id, json_map_from_payload, PointIdentifier};
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{PointId, SearchPoints},
};

use crate::domain::entities::retrieved_node::RetrievedNode;
use crate::ports::point_search_port::{PointSearchPort, PointSearchPortError};

/// [`PointSearchPort`] adapter over Qdrant. Not bound to one collection: the
/// target collection comes with each question.
pub struct PointQdrantRepository {
    client: QdrantClient,
}

impl PointQdrantRepository {
    pub fn new(client: QdrantClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PointSearchPort for PointQdrantRepository {
    #[tracing::instrument(
        name = "Searching nearest points in Qdrant",
        skip(self, vector),
        fields(nb_dims = vector.len())
    )]
    async fn search_nearest(
        &self,
        collection_name: &str,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<PointIdentifier>, PointSearchPortError> {
        let request = SearchPoints {
            collection_name: collection_name.to_string(),
            vector,
            limit,
            // Identifiers only here, the payloads come with the node fetch
            with_payload: Some(false.into()),
            ..Default::default()
        };

        let response = self
            .client
            .search_points(&request)
            .await
            .map_err(|error| PointSearchPortError::StoreError(error.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| point.id.as_ref().and_then(identifier_from_point_id))
            .collect())
    }

    #[tracing::instrument(
        name = "Fetching content nodes from Qdrant",
        skip(self, ids),
        fields(nb_ids = ids.len())
    )]
    async fn get_nodes(
        &self,
        collection_name: &str,
        ids: &[PointIdentifier],
    ) -> Result<Vec<RetrievedNode>, PointSearchPortError> {
        let point_ids: Vec<PointId> = ids.iter().map(PointId::from).collect();

        let response = self
            .client
            .get_points(collection_name, &point_ids, Some(false), Some(true), None)
            .await
            .map_err(|error| PointSearchPortError::StoreError(error.to_string()))?;

        let mut nodes_by_id: HashMap<PointIdentifier, RetrievedNode> = response
            .result
            .into_iter()
            .filter_map(|point| {
                let id = point.id.as_ref().and_then(identifier_from_point_id)?;
                let payload = json_map_from_payload(&point.payload);
                let text = extract_text(&payload).unwrap_or_default();
                Some((id.clone(), RetrievedNode { id, text, payload }))
            })
            .collect();

        // Back to the search order. Points deleted since the search are
        // silently absent.
        Ok(ids
            .iter()
            .filter_map(|id| nodes_by_id.remove(id))
            .collect())
    }
}
