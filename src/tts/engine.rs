use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

use hound::{SampleFormat, WavSpec, WavWriter};
use lazy_static::lazy_static;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use regex::Regex;

use crate::tts::model::Model;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// The loaded speech model: renders text as a finished WAV file at `dest`.
///
/// Calls may arrive from many threads at once; an implementation wrapping a
/// model that is not safe for concurrent inference must serialize internally.
pub trait SynthesisEngine: Send + Sync {
    fn synthesize_to(&self, text: &str, dest: &Path) -> Result<(), EngineError>;
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Engine initialization failed: {0}")]
    Init(String),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

/// VITS-style ONNX voice (Piper format).
///
/// ONNX Runtime sessions run via `&mut self`, so the single shared session
/// sits behind a mutex: concurrent requests queue here instead of
/// re-entering the model.
pub struct VitsEngine {
    session: Mutex<Session>,
    espeak_voice: String,
    phoneme_id_map: HashMap<String, Vec<i64>>,
    sample_rate: u32,
    noise_scale: f32,
    length_scale: f32,
    noise_w: f32,
}

impl VitsEngine {
    pub fn new(model: &Model) -> Result<Self, EngineError> {
        // Load the ONNX model using ort (official ONNX Runtime)
        let session = Session::builder()
            .map_err(|e| EngineError::Init(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EngineError::Init(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| EngineError::Init(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model.onnx_path)
            .map_err(|e| EngineError::Init(format!("Failed to load model: {}", e)))?;

        let inference = model.config.inference.clone().unwrap_or_default();
        let espeak_voice = model
            .config
            .espeak
            .as_ref()
            .map(|e| e.voice.clone())
            .unwrap_or_else(|| "en".to_string());

        Ok(Self {
            session: Mutex::new(session),
            espeak_voice,
            phoneme_id_map: model.config.phoneme_id_map.clone(),
            sample_rate: model.config.audio.sample_rate,
            noise_scale: inference.noise_scale,
            length_scale: inference.length_scale,
            noise_w: inference.noise_w,
        })
    }

    fn infer(&self, phoneme_ids: &[i64]) -> Result<Vec<f32>, EngineError> {
        if phoneme_ids.is_empty() {
            return Ok(Vec::new());
        }

        let input_len = phoneme_ids.len();

        // Prepare input tensors
        // input: [batch, sequence] = [1, phoneme_count]
        let input_value = Value::from_array((vec![1, input_len], phoneme_ids.to_vec()))
            .map_err(|e| EngineError::Synthesis(format!("Failed to create input tensor: {}", e)))?;

        // input_lengths: [batch] = [1]
        let lengths_value = Value::from_array((vec![1], vec![input_len as i64])).map_err(|e| {
            EngineError::Synthesis(format!("Failed to create lengths tensor: {}", e))
        })?;

        // scales: [3] = [noise_scale, length_scale, noise_w]
        let scales_value = Value::from_array((
            vec![3],
            vec![self.noise_scale, self.length_scale, self.noise_w],
        ))
        .map_err(|e| EngineError::Synthesis(format!("Failed to create scales tensor: {}", e)))?;

        // Run inference. A panicked inference must not poison the session
        // for every later request; take the guard back regardless.
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outputs = session
            .run(ort::inputs![input_value, lengths_value, scales_value])
            .map_err(|e| EngineError::Synthesis(format!("Inference failed: {}", e)))?;

        // Extract audio samples from output
        let output = outputs
            .get("output")
            .or_else(|| outputs.get("audio"))
            .ok_or_else(|| EngineError::Synthesis("Missing output tensor".to_string()))?;

        let output_view = output
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::Synthesis(format!("Failed to extract output tensor: {}", e)))?;

        let audio: Vec<f32> = output_view.1.iter().copied().collect();

        Ok(audio)
    }
}

impl SynthesisEngine for VitsEngine {
    fn synthesize_to(&self, text: &str, dest: &Path) -> Result<(), EngineError> {
        let cleaned = normalize_text(text);
        let phonemes = phonemize(&cleaned, &self.espeak_voice)?;
        let ids = phonemes_to_ids(&phonemes, &self.phoneme_id_map);
        let samples = self.infer(&ids)?;
        write_wav(dest, &samples, self.sample_rate)
    }
}

/// Collapse whitespace runs so espeak-ng sees a single-line sentence
fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_string()
}

/// Convert text to phonemes using espeak-ng
fn phonemize(text: &str, voice: &str) -> Result<String, EngineError> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let output = Command::new("espeak-ng")
        .args(["--ipa", "-q", "-v", voice, text])
        .output()
        .map_err(|e| {
            EngineError::Unavailable(format!(
                "Failed to run espeak-ng (is it installed?): {}",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineError::Synthesis(format!(
            "espeak-ng failed: {}",
            stderr.trim()
        )));
    }

    let phonemes = String::from_utf8_lossy(&output.stdout).trim().to_string();

    Ok(phonemes)
}

/// Convert phonemes to IDs using the model's phoneme map
fn phonemes_to_ids(phonemes: &str, id_map: &HashMap<String, Vec<i64>>) -> Vec<i64> {
    let mut ids = Vec::new();

    // Add BOS (beginning of sequence) - typically 0 or mapped value
    if let Some(bos) = id_map.get("^") {
        ids.extend(bos);
    } else {
        ids.push(0);
    }

    // Process each character/phoneme
    for ch in phonemes.chars() {
        let ch_str = ch.to_string();
        if let Some(mapped) = id_map.get(&ch_str) {
            ids.extend(mapped);
        }
        // Add padding between phonemes if available
        if let Some(pad) = id_map.get("_") {
            ids.extend(pad);
        }
    }

    // Add EOS (end of sequence)
    if let Some(eos) = id_map.get("$") {
        ids.extend(eos);
    } else {
        ids.push(0);
    }

    ids
}

/// Encode mono f32 samples as 16-bit PCM WAV at `dest`
fn write_wav(dest: &Path, samples: &[f32], sample_rate: u32) -> Result<(), EngineError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(dest, spec)
        .map_err(|e| EngineError::Synthesis(format!("Failed to create WAV writer: {}", e)))?;

    for sample in samples {
        // Convert f32 [-1.0, 1.0] to i16 full scale
        let scaled = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| EngineError::Synthesis(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| EngineError::Synthesis(format!("Failed to finalize WAV: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_text("  Hello\n\n  world\tagain "),
            "Hello world again"
        );
        assert_eq!(normalize_text("plain"), "plain");
    }

    #[test]
    fn test_phonemes_to_ids_empty() {
        let map = HashMap::new();
        let ids = phonemes_to_ids("", &map);
        // Should have at least BOS and EOS
        assert!(!ids.is_empty());
    }

    #[test]
    fn test_phonemes_to_ids_maps_and_pads() {
        let mut map = HashMap::new();
        map.insert("^".to_string(), vec![1]);
        map.insert("$".to_string(), vec![2]);
        map.insert("_".to_string(), vec![0]);
        map.insert("a".to_string(), vec![14]);

        let ids = phonemes_to_ids("a", &map);
        assert_eq!(ids, vec![1, 14, 0, 2]);
    }

    #[test]
    fn test_phonemes_to_ids_skips_unmapped() {
        let mut map = HashMap::new();
        map.insert("^".to_string(), vec![1]);
        map.insert("$".to_string(), vec![2]);

        let ids = phonemes_to_ids("xyz", &map);
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_write_wav_empty_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("empty.wav");

        write_wav(&dest, &[], 22050).unwrap();

        let wav = std::fs::read(&dest).unwrap();
        // Valid WAV header even for empty audio
        assert!(wav.starts_with(b"RIFF"));
        assert!(wav.len() >= 44);
    }

    #[test]
    fn test_write_wav_valid_samples() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tone.wav");

        let samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        write_wav(&dest, &samples, 22050).unwrap();

        let wav = std::fs::read(&dest).unwrap();
        assert!(wav.starts_with(b"RIFF"));
        assert!(wav.len() > 44); // Header + some data
    }
}
