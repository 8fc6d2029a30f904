use std::{net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use common::core::fastembed_embedding::FastembedEmbeddingsService;
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use secrecy::ExposeSecret;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{QdrantSettings, Settings},
    repositories::{
        completion_openai_like_repository::CompletionOpenAiLikeRepository,
        point_qdrant_repository::PointQdrantRepository,
    },
    routes::{ask, health_check},
    use_cases::answer_question::AnswerQuestionUseCase,
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),
}

impl Application {
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr().unwrap().port();

        let qdrant_client = get_qdrant_client(&settings.qdrant)?;
        let point_search_repository = Arc::new(PointQdrantRepository::new(qdrant_client));

        let query_encoder = Arc::new(FastembedEmbeddingsService::new(
            &settings.embeddings.model_name,
            settings.embeddings.cache_dir.clone(),
        ));

        if settings.llm.api_key.is_none() {
            warn!(
                "No LLM API key configured (APP_LLM__API_KEY): \
                 completion calls will go out unauthenticated"
            );
        }
        let completion_repository = Arc::new(CompletionOpenAiLikeRepository::new(&settings.llm));

        let answer_question_use_case = AnswerQuestionUseCase::new(
            query_encoder,
            point_search_repository,
            completion_repository,
        );

        let server = run(listener, settings, nb_workers, answer_question_use_case)?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    settings: Settings,
    nb_workers: Option<usize>,
    answer_question_use_case: AnswerQuestionUseCase,
) -> Result<Server, std::io::Error> {
    // Wraps the use case in a `actix_web::Data` (`Arc`) to be able to register
    // it and access it from handlers. Shared among all workers.
    let answer_question_use_case = Data::new(answer_question_use_case);
    let cors_allowed_origin = settings.application.cors_allowed_origin;

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        info!("Starting actix-web worker");

        // Only the configured frontend origin may call the API from a browser
        let cors = Cors::default()
            .allowed_origin(&cors_allowed_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .route("/health_check", web::get().to(health_check))
            .route("/ask", web::post().to(ask))
            .app_data(answer_question_use_case.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

/// Set up a client to Qdrant
///
/// The API key, when the cluster needs one, only comes from the environment
/// (`APP_QDRANT__API_KEY`): there is no in-code or in-file default.
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, ApplicationBuildError> {
    let mut qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    if let Some(api_key) = &config.api_key {
        qdrant_config.api_key = Some(api_key.expose_secret().to_string());
    }

    QdrantClient::new(Some(qdrant_config))
        .map_err(|e| ApplicationBuildError::QdrantError(e.to_string()))
}
