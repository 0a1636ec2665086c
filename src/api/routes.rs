use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::tts::TtsService;

pub struct AppState {
    pub tts: TtsService,
    pub max_text_chars: usize,
}

/// All routes sit behind a fixed allow-all CORS policy; the gateway is meant
/// to be called from browser frontends on any origin. Tightening it is a
/// deployment concern.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/tts", post(handlers::synthesize))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
