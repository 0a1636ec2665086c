use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MODEL: &str = "en_US-ljspeech-medium";

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub model_dir: PathBuf,
    pub model_id: String,
    pub scratch_dir: PathBuf,
    pub max_text_chars: usize,
    pub synthesis_timeout: Duration,
}

impl Config {
    /// Malformed numeric values are operator errors and abort startup.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = env_or("PORT", "5001")
            .parse()
            .expect("PORT must be a number");
        let bind_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .expect("Invalid bind address");

        let model_dir = PathBuf::from(env_or("MODEL_DIR", "./models"));
        let model_id = env_or("MODEL", DEFAULT_MODEL);

        let scratch_dir = std::env::var("SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let max_text_chars: usize = env_or("MAX_TEXT_CHARS", "10000")
            .parse()
            .expect("MAX_TEXT_CHARS must be a number");

        let timeout_secs: u64 = env_or("SYNTHESIS_TIMEOUT_SECS", "60")
            .parse()
            .expect("SYNTHESIS_TIMEOUT_SECS must be a number");

        Self {
            bind_addr,
            model_dir,
            model_id,
            scratch_dir,
            max_text_chars,
            synthesis_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
