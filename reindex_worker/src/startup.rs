use std::sync::Arc;

use common::core::fastembed_embedding::FastembedEmbeddingsService;
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use secrecy::ExposeSecret;

use crate::{
    configuration::{QdrantSettings, Settings},
    repositories::point_qdrant_repository::PointQdrantRepository,
    use_cases::reindex_collection::{
        ReindexCollectionError, ReindexCollectionRequest, ReindexCollectionUseCase, RunSummary,
    },
};

/// Holds the assembled reindex pipeline for one collection
pub struct Application {
    reindex_collection_use_case: ReindexCollectionUseCase,
}

impl Application {
    #[tracing::instrument(name = "Building reindex worker application", skip(settings))]
    pub fn build(settings: Settings, collection_name: &str) -> Result<Self, ApplicationError> {
        let qdrant_client = get_qdrant_client(&settings.qdrant)?;
        let point_repository = Arc::new(PointQdrantRepository::new(qdrant_client, collection_name));

        let embeddings_service = Arc::new(FastembedEmbeddingsService::new(
            &settings.embeddings.model_name,
            settings.embeddings.cache_dir.clone(),
        ));

        Ok(Self {
            reindex_collection_use_case: ReindexCollectionUseCase::new(
                point_repository,
                embeddings_service,
            ),
        })
    }

    /// Runs one reindex pass and returns its counters
    pub async fn run(
        &self,
        request: ReindexCollectionRequest,
    ) -> Result<RunSummary, ReindexCollectionError> {
        self.reindex_collection_use_case.execute(request).await
    }
}

/// Set up a client to Qdrant
///
/// The API key, when the cluster needs one, only comes from the environment
/// (`APP_QDRANT__API_KEY`): there is no in-code or in-file default.
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, ApplicationError> {
    let mut qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    if let Some(api_key) = &config.api_key {
        qdrant_config.api_key = Some(api_key.expose_secret().to_string());
    }

    QdrantClient::new(Some(qdrant_config)).map_err(|e| ApplicationError::QdrantError(e.to_string()))
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),
}
