/// LLM Client — the single point of entry for all OpenAI API calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gpt-4o (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o";
/// Fixed sampling temperature. Replies vary slightly but stay on-template.
const TEMPERATURE: f32 = 0.7;
/// Hook payloads are one-liners; anything slower than this is a stuck
/// connection, surfaced to the caller as a connectivity failure.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("connection failure: {0}")]
    Network(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
    code: Option<String>,
}

/// Seam between the gateway and the remote model. The production
/// implementation is `LlmClient`; tests substitute a stub.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends one system + user message pair and returns the reply's
    /// message body text. Exactly one remote attempt per call.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// The single LLM client used by the analysis gateway.
/// Wraps the OpenAI chat completions API in JSON-object reply mode.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes one call to the chat completions API and returns the message
    /// body text. No retries: every failure is terminal for this request
    /// and classified by the caller.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    LlmError::Network(e.to_string())
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let (code, message) = parse_error_body(&body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        debug!("LLM call succeeded");

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.chat(system, user).await
    }
}

/// Extracts the machine-readable error code and message from an OpenAI
/// error body. Falls back to the raw body when it is not the expected
/// envelope.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    match serde_json::from_str::<OpenAiError>(body) {
        Ok(parsed) => (parsed.error.code, parsed.error.message),
        Err(_) => (None, body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_body_with_code() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#;
        let (code, message) = parse_error_body(body);
        assert_eq!(code.as_deref(), Some("invalid_api_key"));
        assert_eq!(message, "Incorrect API key provided");
    }

    #[test]
    fn test_parse_error_body_without_code() {
        let body = r#"{"error": {"message": "The server is overloaded", "type": "server_error", "code": null}}"#;
        let (code, message) = parse_error_body(body);
        assert!(code.is_none());
        assert_eq!(message, "The server is overloaded");
    }

    #[test]
    fn test_parse_error_body_not_json() {
        let body = "upstream proxy error";
        let (code, message) = parse_error_body(body);
        assert!(code.is_none());
        assert_eq!(message, "upstream proxy error");
    }

    #[test]
    fn test_chat_request_serializes_json_object_mode() {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["model"], "gpt-4o");
    }
}
