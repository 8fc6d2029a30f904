use async_trait::async_trait;
use common::helper::error_chain_fmt;

/// Chat completion against a language model.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Returns the model completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionPortError>;
}

#[derive(thiserror::Error)]
pub enum CompletionPortError {
    #[error("Error from the completion API: {0}")]
    CompletionError(String),
    /// The API answered but carried no usable completion.
    #[error("The completion API returned no choice")]
    EmptyCompletion,
}

impl std::fmt::Debug for CompletionPortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
