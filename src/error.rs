use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::tts::engine::EngineError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Synthesis engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Scratch storage error: {0}")]
    ArtifactIo(#[from] std::io::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Init(msg) | EngineError::Unavailable(msg) => {
                AppError::EngineUnavailable(msg)
            }
            EngineError::Synthesis(msg) => AppError::Synthesis(msg),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 4xx bodies carry the field-level message; 5xx bodies stay generic
        // so internal paths and error chains never cross the HTTP boundary.
        let (status, code, message) = match &self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            AppError::EngineUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ENGINE_UNAVAILABLE",
                "Speech engine is unavailable".to_string(),
            ),
            AppError::Synthesis(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SYNTHESIS_FAILED",
                "Speech synthesis failed".to_string(),
            ),
            AppError::ArtifactIo(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SYNTHESIS_FAILED",
                "Speech synthesis failed".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {} - {}", code, self);
        } else {
            tracing::debug!("Request rejected: {} - {}", code, self);
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
