use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Generic message for failures that match no known upstream signal.
const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred while analyzing your hook. Please try again.";

/// Every way a single analysis request can fail, mapped exhaustively to an
/// HTTP status and a user-facing message.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AnalysisError>`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Hook text is required and must be a string")]
    InvalidInput,

    #[error("Hook text cannot be empty")]
    EmptyInput,

    #[error("Invalid API key. Please check your OpenAI API key configuration.")]
    UpstreamAuth,

    #[error("OpenAI API quota exceeded. Please check your usage limits.")]
    QuotaExceeded,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Hook text is too long. Please shorten it and try again.")]
    InputTooLarge,

    #[error("{message}")]
    MalformedReply { message: &'static str },

    #[error("Failed to connect to OpenAI API. Please check your internet connection.")]
    Network(String),

    #[error("{message}")]
    Unknown {
        message: String,
        detail: Option<String>,
    },
}

impl AnalysisError {
    /// The model call returned no usable message body.
    pub fn empty_reply() -> Self {
        AnalysisError::MalformedReply {
            message: "Invalid response format from OpenAI API",
        }
    }

    /// The message body was not the JSON shape the prompt demands.
    pub fn unparseable_reply() -> Self {
        AnalysisError::MalformedReply {
            message: "Failed to parse analysis results",
        }
    }

    /// Classifies a failed model call by the provider's machine-readable
    /// error code. Unrecognized failures become `Unknown`, carrying the
    /// raw error as diagnostic detail only when `verbose` is set.
    pub fn from_upstream(err: LlmError, verbose: bool) -> Self {
        if let LlmError::Api {
            code: Some(code), ..
        } = &err
        {
            match code.as_str() {
                "invalid_api_key" => return AnalysisError::UpstreamAuth,
                "insufficient_quota" => return AnalysisError::QuotaExceeded,
                "rate_limit_exceeded" => return AnalysisError::RateLimited,
                "context_length_exceeded" => return AnalysisError::InputTooLarge,
                _ => {}
            }
        }

        match err {
            LlmError::EmptyContent => Self::empty_reply(),
            LlmError::Network(detail) => AnalysisError::Network(detail),
            other => Self::unknown(other, verbose),
        }
    }

    fn unknown(err: LlmError, verbose: bool) -> Self {
        AnalysisError::Unknown {
            message: UNEXPECTED_ERROR_MESSAGE.to_string(),
            detail: verbose.then(|| err.to_string()),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidInput | AnalysisError::EmptyInput => StatusCode::BAD_REQUEST,
            AnalysisError::UpstreamAuth => StatusCode::UNAUTHORIZED,
            AnalysisError::QuotaExceeded | AnalysisError::RateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AnalysisError::InputTooLarge => StatusCode::BAD_REQUEST,
            AnalysisError::MalformedReply { .. } | AnalysisError::Unknown { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AnalysisError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AnalysisError::InvalidInput | AnalysisError::EmptyInput => {
                tracing::warn!("Rejected analysis request: {self}");
            }
            AnalysisError::Network(detail) => {
                tracing::error!("Connection to OpenAI API failed: {detail}");
            }
            AnalysisError::Unknown { detail, .. } => {
                tracing::error!(
                    "Unclassified analysis failure: {}",
                    detail.as_deref().unwrap_or("no detail captured")
                );
            }
            other => {
                tracing::error!("Error analyzing hook: {other}");
            }
        }

        let body = match &self {
            AnalysisError::Unknown {
                message,
                detail: Some(detail),
            } => json!({ "error": message, "details": detail }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: &str) -> LlmError {
        LlmError::Api {
            status: 400,
            code: Some(code.to_string()),
            message: format!("upstream message for {code}"),
        }
    }

    #[test]
    fn test_invalid_api_key_classifies_as_auth() {
        let err = AnalysisError::from_upstream(api_error("invalid_api_key"), false);
        assert!(matches!(err, AnalysisError::UpstreamAuth));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_insufficient_quota_classifies_as_quota() {
        let err = AnalysisError::from_upstream(api_error("insufficient_quota"), false);
        assert!(matches!(err, AnalysisError::QuotaExceeded));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_rate_limit_classifies_as_rate_limited() {
        let err = AnalysisError::from_upstream(api_error("rate_limit_exceeded"), false);
        assert!(matches!(err, AnalysisError::RateLimited));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn test_context_length_classifies_as_too_large() {
        let err = AnalysisError::from_upstream(api_error("context_length_exceeded"), false);
        assert!(matches!(err, AnalysisError::InputTooLarge));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_network_classifies_as_service_unavailable() {
        let err = AnalysisError::from_upstream(
            LlmError::Network("connection refused".to_string()),
            false,
        );
        assert!(matches!(err, AnalysisError::Network(_)));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_empty_content_classifies_as_malformed_reply() {
        let err = AnalysisError::from_upstream(LlmError::EmptyContent, false);
        assert_eq!(err.to_string(), "Invalid response format from OpenAI API");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unrecognized_code_classifies_as_unknown() {
        let err = AnalysisError::from_upstream(api_error("model_overloaded"), false);
        match err {
            AnalysisError::Unknown { detail, .. } => assert!(detail.is_none()),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_carries_detail_when_verbose() {
        let err = AnalysisError::from_upstream(api_error("model_overloaded"), true);
        match err {
            AnalysisError::Unknown { detail, .. } => {
                let detail = detail.expect("verbose mode should capture detail");
                assert!(detail.contains("model_overloaded"));
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_without_code_is_unknown() {
        let err = AnalysisError::from_upstream(
            LlmError::Api {
                status: 401,
                code: None,
                message: "unauthorized".to_string(),
            },
            false,
        );
        // No status-based fallback: classification trusts provider codes only.
        assert!(matches!(err, AnalysisError::Unknown { .. }));
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        assert_eq!(AnalysisError::InvalidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AnalysisError::EmptyInput.status(), StatusCode::BAD_REQUEST);
    }
}
