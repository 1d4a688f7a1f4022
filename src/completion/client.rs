use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::turn::Turn;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Produces the next assistant message for a conversation.
///
/// Implementations never fail: problems are reported as text that callers
/// forward to the user like any other content.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, history: &[Turn]) -> String;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

enum Failure {
    Status(StatusCode),
    Network(reqwest::Error),
    Unexpected(String),
}

impl Failure {
    fn into_message(self) -> String {
        match self {
            Self::Status(status) => format!(
                "Error: Unable to get response. Status code: {}",
                status.as_u16()
            ),
            Self::Network(e) => format!("Network error occurred: {e}"),
            Self::Unexpected(detail) => format!("Unexpected error occurred: {detail}"),
        }
    }
}

/// Chat completion client for OpenAI-compatible APIs.
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(endpoint: String, api_key: Option<String>, model: String, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
            max_tokens,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, history: &[Turn]) -> Result<String, Failure> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: history,
            max_tokens: self.max_tokens,
        };

        let mut http_request = self.client.post(self.url()).json(&body);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request.send().await.map_err(Failure::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "completion API returned an error body");
            return Err(Failure::Status(status));
        }

        let bytes = response.bytes().await.map_err(Failure::Network)?;
        let parsed: ChatCompletionResponse =
            serde_json::from_slice(&bytes).map_err(|e| Failure::Unexpected(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Failure::Unexpected("response contained no message content".into()))
    }
}

#[async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, history: &[Turn]) -> String {
        debug!(turns = history.len(), model = %self.model, "requesting completion");
        match self.request(history).await {
            Ok(content) => content,
            Err(failure) => {
                let message = failure.into_message();
                error!("{message}");
                message
            }
        }
    }
}
