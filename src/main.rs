use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod tts;

use api::routes::{create_router, AppState};
use config::Config;
use tts::{Model, ScratchStore, TtsService, VitsEngine};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    tracing::info!("TTS Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Bring the engine up before accepting any traffic; a broken model is
    // fatal and the process must not bind.
    let model = match Model::load(&config.model_dir, &config.model_id) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("Failed to load model '{}': {}", config.model_id, e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Loaded model {} ({} Hz)",
        model.id,
        model.config.audio.sample_rate
    );

    let engine = match VitsEngine::new(&model) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to initialize synthesis engine: {}", e);
            std::process::exit(1);
        }
    };

    let scratch = match ScratchStore::new(&config.scratch_dir) {
        Ok(scratch) => scratch,
        Err(e) => {
            tracing::error!(
                "Failed to prepare scratch directory {}: {}",
                config.scratch_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };
    tracing::info!("Scratch directory: {}", scratch.root().display());

    // Create TTS service
    let tts = TtsService::new(Arc::new(engine), scratch, config.synthesis_timeout);

    // Create app state
    let state = Arc::new(AppState {
        tts,
        max_text_chars: config.max_text_chars,
    });

    // Create router
    let app = create_router(state);

    tracing::info!("Starting server on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
