use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::tts::engine::EngineError;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub audio: AudioConfig,
    pub espeak: Option<EspeakConfig>,
    #[serde(default)]
    pub phoneme_id_map: HashMap<String, Vec<i64>>,
    #[serde(default)]
    pub inference: Option<InferenceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspeakConfig {
    pub voice: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,
    #[serde(default = "default_noise_w")]
    pub noise_w: f32,
}

fn default_noise_scale() -> f32 {
    0.667
}

fn default_length_scale() -> f32 {
    1.0
}

fn default_noise_w() -> f32 {
    0.8
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            noise_scale: default_noise_scale(),
            length_scale: default_length_scale(),
            noise_w: default_noise_w(),
        }
    }
}

/// A speech model on disk: `<id>.onnx` next to its `<id>.onnx.json` sidecar.
#[derive(Debug)]
pub struct Model {
    pub id: String,
    pub config: ModelConfig,
    pub onnx_path: PathBuf,
}

impl Model {
    pub fn load(model_dir: &Path, model_id: &str) -> Result<Self, EngineError> {
        let onnx_path = model_dir.join(format!("{}.onnx", model_id));
        let config_path = model_dir.join(format!("{}.onnx.json", model_id));

        if !onnx_path.exists() {
            return Err(EngineError::Init(format!(
                "Model file not found: {}",
                onnx_path.display()
            )));
        }

        if !config_path.exists() {
            return Err(EngineError::Init(format!(
                "Model config not found: {}",
                config_path.display()
            )));
        }

        let file = File::open(&config_path)
            .map_err(|e| EngineError::Init(format!("Failed to open model config: {}", e)))?;
        let config: ModelConfig = serde_json::from_reader(file)
            .map_err(|e| EngineError::Init(format!("Invalid model config: {}", e)))?;

        Ok(Self {
            id: model_id.to_string(),
            config,
            onnx_path,
        })
    }
}
