//! OpenAI-compatible chat-completions client.

use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters of an error body kept in [`Error::Status`].
const ERROR_BODY_LIMIT: usize = 100;

/// Language-model client.
///
/// Cheap to clone; the underlying HTTP connection pool is shared.
#[derive(Debug, Clone)]
pub struct AiClient {
    api_key: Option<String>,
    endpoint: String,
    model: String,
    timeout: Duration,
    http_client: Client,
}

/// A model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Message content of the first choice.
    pub content: String,
    /// Tokens billed for the request, if reported.
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

impl AiClient {
    /// Creates a client for the default endpoint and model.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: REQUEST_TIMEOUT,
            http_client: Client::new(),
        }
    }

    /// Sets the chat-completions endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Checks whether an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends a single-message chat request.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no key is configured, the request fails
    /// or times out, or the status is not a success. Returns a malformed
    /// error if the reply cannot be decoded or has no content.
    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<Completion> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        debug!(
            "Chat request to {} (model {}, {} prompt chars)",
            self.endpoint,
            self.model,
            prompt.len()
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        parse_completion(&body)
    }
}

/// Decodes a chat-completions response body.
///
/// # Errors
///
/// Returns an error if the body is not valid JSON or has no message content.
pub fn parse_completion(body: &str) -> Result<Completion> {
    let response: ChatResponse = serde_json::from_str(body)?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(Error::EmptyResponse)?;

    Ok(Completion {
        content,
        total_tokens: response.usage.and_then(|u| u.total_tokens),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailveil_redact::ErrorKind;

    #[test]
    fn test_parse_completion() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hi [NAME]"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.content, "Hi [NAME]");
        assert_eq!(completion.total_tokens, Some(13));
    }

    #[test]
    fn test_parse_completion_without_usage() {
        let body = r#"{"choices": [{"message": {"content": "ok"}}]}"#;
        assert_eq!(parse_completion(body).unwrap().total_tokens, None);
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_parse_completion_invalid_json() {
        let err = parse_completion("<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_blank_key_is_missing() {
        let client = AiClient::new(Some("  ".to_string()));
        assert!(!client.has_api_key());

        let err = tokio_test::block_on(client.complete("hello", 0.3)).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_builder() {
        let client = AiClient::new(Some("k".to_string()))
            .with_model("other-model")
            .with_endpoint("http://localhost:1/v1/chat/completions")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(client.model(), "other-model");
        assert!(client.has_api_key());
    }
}
