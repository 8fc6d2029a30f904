use std::thread::{self, JoinHandle};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::helper::error_chain_fmt;

pub type Embeddings = Vec<f32>;

/// Model used when the requested one cannot be resolved or loaded.
const DEFAULT_MODEL: EmbeddingModel = EmbeddingModel::BGESmallENV15;

/// Service generating embeddings from text contents with a local fastembed
/// (ONNX) model.
///
/// The model runs on a dedicated OS thread: embedding generation is CPU
/// heavy and must not run on the async executor. Async callers talk to the
/// runner through a channel and get their result back on a oneshot.
pub struct FastembedEmbeddingsService {
    sender_to_runner: mpsc::Sender<RunnerMessage>,
    _thread_handle: JoinHandle<()>,
}

impl FastembedEmbeddingsService {
    /// Spawns the embeddings runner on a separate thread and returns the
    /// service used to talk to it.
    ///
    /// The model is not loaded here: the first embeddings request triggers
    /// the (possibly slow) model download and load, so building the service
    /// stays cheap and network-free.
    pub fn new(model_name: &str, cache_dir: Option<String>) -> Self {
        let (sender, receiver) = mpsc::channel(100);
        let model_name = model_name.to_string();
        let handle = thread::spawn(move || Self::runner(receiver, model_name, cache_dir));

        Self {
            sender_to_runner: sender,
            _thread_handle: handle,
        }
    }

    /// The embeddings runner itself.
    ///
    /// Owns the fastembed model and the fallback policy for its whole
    /// lifetime. Exits when every service handle has been dropped.
    #[tracing::instrument(name = "Embeddings runner", skip(receiver))]
    fn runner(
        mut receiver: mpsc::Receiver<RunnerMessage>,
        requested_model: String,
        cache_dir: Option<String>,
    ) {
        let mut policy = EmbeddingFallbackPolicy::new();
        let mut model: Option<TextEmbedding> = None;

        while let Some((texts, reply_sender)) = receiver.blocking_recv() {
            let result = match &model {
                Some(loaded) => Self::embed_texts(loaded, &mut policy, texts),
                None => {
                    match Self::load_model(&mut policy, &requested_model, cache_dir.as_deref()) {
                        Ok(loaded) => {
                            let result = Self::embed_texts(&loaded, &mut policy, texts);
                            model = Some(loaded);
                            result
                        }
                        Err(error) => Err(error),
                    }
                }
            };

            if reply_sender.send(result).is_err() {
                warn!("Embeddings requester dropped before receiving its result");
            }
        }
    }

    /// Loads the requested model, or the provider default once the policy
    /// gave up on the requested one. A default-model load failure is final
    /// for this request (the next request will attempt the load again).
    fn load_model(
        policy: &mut EmbeddingFallbackPolicy,
        requested_model: &str,
        cache_dir: Option<&str>,
    ) -> Result<TextEmbedding, FastembedEmbeddingsServiceError> {
        if !policy.default_model_forced() {
            match resolve_model(requested_model) {
                Some(model) => match TextEmbedding::try_new(init_options(model, cache_dir)) {
                    Ok(loaded) => {
                        info!("Embeddings model {} loaded ✅", requested_model);
                        return Ok(loaded);
                    }
                    Err(error) => policy.force_default_model(requested_model, &error.to_string()),
                },
                None => policy.force_default_model(requested_model, "unknown model name"),
            }
        }

        let loaded = TextEmbedding::try_new(init_options(DEFAULT_MODEL, cache_dir))
            .map_err(|error| FastembedEmbeddingsServiceError::ModelError(error.to_string()))?;
        info!("Default embeddings model loaded ✅");
        Ok(loaded)
    }

    /// Embeds a batch of texts, falling back to per-text encoding through
    /// the policy. A failure while already encoding per-text is final.
    fn embed_texts(
        model: &TextEmbedding,
        policy: &mut EmbeddingFallbackPolicy,
        texts: Vec<String>,
    ) -> Result<Vec<Embeddings>, FastembedEmbeddingsServiceError> {
        if !policy.per_text_forced() {
            match model.embed(texts.clone(), None) {
                Ok(embeddings) => return Ok(embeddings),
                Err(error) => policy.force_per_text(&error.to_string()),
            }
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let mut vectors = model
                .embed(vec![text], None)
                .map_err(|error| FastembedEmbeddingsServiceError::ModelError(error.to_string()))?;
            embeddings.append(&mut vectors);
        }
        Ok(embeddings)
    }

    /// Computes one embedding per input text, preserving order.
    #[tracing::instrument(
        name = "Generating embeddings",
        skip(self, texts),
        fields(nb_texts = texts.len())
    )]
    pub async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Embeddings>, FastembedEmbeddingsServiceError> {
        let (reply_sender, reply_receiver) = oneshot::channel();

        self.sender_to_runner
            .send((texts, reply_sender))
            .await
            .map_err(|_| FastembedEmbeddingsServiceError::RunnerUnavailable)?;

        reply_receiver.await?
    }
}

/// Tracks the recovery transitions the embeddings runner may take, so each
/// one happens at most once and is logged when it does:
/// - an unavailable requested model is replaced by the provider default;
/// - a failed batch call switches the runner to per-text encoding.
///
/// A failure once the corresponding fallback is active surfaces as a
/// [`FastembedEmbeddingsServiceError::ModelError`] at the call site.
pub struct EmbeddingFallbackPolicy {
    default_model_forced: bool,
    per_text_forced: bool,
}

impl EmbeddingFallbackPolicy {
    pub fn new() -> Self {
        Self {
            default_model_forced: false,
            per_text_forced: false,
        }
    }

    /// Records that the requested model cannot be used: from now on only the
    /// provider default model is attempted.
    pub fn force_default_model(&mut self, requested_model: &str, reason: &str) {
        if !self.default_model_forced {
            warn!(
                requested_model,
                reason, "Requested embeddings model unavailable, falling back to the provider default"
            );
            self.default_model_forced = true;
        }
    }

    pub fn default_model_forced(&self) -> bool {
        self.default_model_forced
    }

    /// Records a failed batch call: the runner encodes per-text from now on.
    pub fn force_per_text(&mut self, reason: &str) {
        if !self.per_text_forced {
            warn!(
                reason,
                "Batch embedding call failed, falling back to per-text encoding"
            );
            self.per_text_forced = true;
        }
    }

    pub fn per_text_forced(&self) -> bool {
        self.per_text_forced
    }
}

impl Default for EmbeddingFallbackPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error)]
pub enum FastembedEmbeddingsServiceError {
    #[error("Embeddings model error: {0}")]
    ModelError(String),
    #[error("The embeddings runner is no longer running")]
    RunnerUnavailable,
    #[error(transparent)]
    ReceiverError(#[from] tokio::sync::oneshot::error::RecvError),
}

impl std::fmt::Debug for FastembedEmbeddingsServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Maps a configured model name to a fastembed model, accepting both the
/// upstream (Hugging Face) spelling and the short one.
fn resolve_model(name: &str) -> Option<EmbeddingModel> {
    match name {
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        "BAAI/bge-large-en-v1.5" | "bge-large-en-v1.5" => Some(EmbeddingModel::BGELargeENV15),
        "sentence-transformers/all-MiniLM-L6-v2" | "all-minilm-l6-v2" => {
            Some(EmbeddingModel::AllMiniLML6V2)
        }
        _ => None,
    }
}

fn init_options(model: EmbeddingModel, cache_dir: Option<&str>) -> InitOptions {
    let mut options = InitOptions::new(model);
    if let Some(path) = cache_dir {
        options = options.with_cache_dir(std::path::PathBuf::from(path));
    }
    options
}

/// Message type for the internal channel, passing around input texts and a
/// oneshot to send the generated embeddings back
type RunnerMessage = (
    Vec<String>,
    oneshot::Sender<Result<Vec<Embeddings>, FastembedEmbeddingsServiceError>>,
);
