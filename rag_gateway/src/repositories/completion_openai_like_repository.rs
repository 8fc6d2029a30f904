use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::LlmSettings;
use crate::ports::completion_port::{CompletionPort, CompletionPortError};

/// [`CompletionPort`] adapter over an OpenAI-compatible chat completion API
/// (Mistral "La Plateforme" by default).
pub struct CompletionOpenAiLikeRepository {
    http_client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<Secret<String>>,
}

impl CompletionOpenAiLikeRepository {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        }
    }
}

#[async_trait]
impl CompletionPort for CompletionOpenAiLikeRepository {
    #[tracing::instrument(
        name = "Requesting chat completion",
        skip(self, prompt),
        fields(model = %self.model)
    )]
    async fn complete(&self, prompt: &str) -> Result<String, CompletionPortError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut call = self
            .http_client
            .post(format!("{}/chat/completions", self.api_base))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key.expose_secret());
        }

        let response = call
            .send()
            .await
            .map_err(|error| CompletionPortError::CompletionError(error.to_string()))?
            .error_for_status()
            .map_err(|error| CompletionPortError::CompletionError(error.to_string()))?
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|error| CompletionPortError::CompletionError(error.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionPortError::EmptyCompletion)
    }
}

#[derive(Debug, serde::Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn the_completion_request_serializes_to_the_openai_chat_shape() {
        let request = ChatCompletionRequest {
            model: "mistral-large-latest",
            messages: vec![ChatMessage {
                role: "user",
                content: "a grounded question",
            }],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "mistral-large-latest",
                "messages": [{"role": "user", "content": "a grounded question"}],
            })
        );
    }

    #[test]
    fn the_completion_response_parses_ignoring_extra_fields() {
        let body = json!({
            "id": "cmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "The answer."},
                "finish_reason": "stop",
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4},
        });

        let parsed: ChatCompletionResponse = serde_json::from_value(body).unwrap();

        assert_eq!(parsed.choices[0].message.content, "The answer.");
    }
}
