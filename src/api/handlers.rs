use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::SynthesizeRequest;
use crate::api::routes::AppState;
use crate::error::AppError;

/// Static liveness string for load balancers and smoke checks.
pub async fn index() -> &'static str {
    concat!("tts-gateway v", env!("CARGO_PKG_VERSION"))
}

pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    // A malformed body is a client error, never a dropped connection
    let Json(request) =
        payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    // Validate input
    let text = request.text.as_deref().unwrap_or("").trim();
    if text.is_empty() {
        return Err(AppError::InvalidRequest(
            "Missing or blank 'text' field".into(),
        ));
    }

    // The bound is in characters, not UTF-8 bytes
    if text.chars().count() > state.max_text_chars {
        return Err(AppError::InvalidRequest(format!(
            "Text too long (max {} chars)",
            state.max_text_chars
        )));
    }

    // Generate audio
    let wav = state.tts.synthesize(text.to_string()).await?;

    // Return audio response with a download filename
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"speech.wav\"",
            ),
        ],
        wav,
    )
        .into_response())
}
