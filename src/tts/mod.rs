pub mod engine;
pub mod model;
pub mod scratch;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::AppError;

pub use engine::{EngineError, SynthesisEngine, VitsEngine};
pub use model::Model;
pub use scratch::ScratchStore;

pub struct TtsService {
    engine: Arc<dyn SynthesisEngine>,
    scratch: ScratchStore,
    timeout: Duration,
}

impl TtsService {
    pub fn new(engine: Arc<dyn SynthesisEngine>, scratch: ScratchStore, timeout: Duration) -> Self {
        Self {
            engine,
            scratch,
            timeout,
        }
    }

    /// Synthesize `text` and return the finished WAV bytes.
    ///
    /// The model call is CPU-bound and runs on the blocking pool. The scratch
    /// artifact is owned by that task, so the file is removed when synthesis
    /// finishes even if this future is dropped mid-flight or the wait below
    /// times out.
    pub async fn synthesize(&self, text: String) -> Result<Vec<u8>, AppError> {
        // 1. Reserve a scratch artifact for this request
        let artifact = self.scratch.acquire()?;
        let engine = Arc::clone(&self.engine);

        // 2. Run the engine off the async runtime
        let task = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            engine.synthesize_to(&text, artifact.path())?;

            // 3. Read the WAV back before the artifact drops
            let wav = artifact.read()?;
            tracing::debug!("Synthesized {} bytes in {:?}", wav.len(), started.elapsed());
            Ok::<_, AppError>(wav)
        });

        // 4. Bound the wait; a started model call is never cancelled
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(AppError::Synthesis(format!(
                "Synthesis task failed: {}",
                join_error
            ))),
            Err(_) => Err(AppError::Synthesis(format!(
                "Synthesis timed out after {:?}",
                self.timeout
            ))),
        }
    }
}
