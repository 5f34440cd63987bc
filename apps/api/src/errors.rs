use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::speech::SpeechError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every error is request-scoped; none of them terminates the process. LLM
/// failures never appear here; the evaluation and reporting paths recover
/// them locally with rule-based fallbacks.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Speech capability unavailable: {0}")]
    SpeechUnavailable(String),

    #[error("Speech provider error: {0}")]
    Speech(String),

    #[error("Speech timeout: {0}")]
    SpeechTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SpeechError> for AppError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Unconfigured(_) => AppError::SpeechUnavailable(err.to_string()),
            SpeechError::Timeout(_) => AppError::SpeechTimeout(err.to_string()),
            SpeechError::Provider(msg) | SpeechError::Transport(msg) => AppError::Speech(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InvalidState(msg) => (StatusCode::BAD_REQUEST, "INVALID_STATE", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SpeechUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SPEECH_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Speech(msg) => {
                tracing::error!("Speech provider error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SPEECH_ERROR",
                    "A speech processing error occurred".to_string(),
                )
            }
            AppError::SpeechTimeout(msg) => {
                tracing::error!("Speech timeout: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "SPEECH_TIMEOUT",
                    "Speech processing timed out".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
