pub mod handlers;
pub mod routes;

use serde::Deserialize;

/// Body of `POST /api/tts`. `text` is optional at the serde level so a
/// missing field is reported by the gateway's own 400, not a framework
/// rejection.
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: Option<String>,
}
