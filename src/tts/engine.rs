use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::Deserialize;

use crate::audio;
use crate::error::AppError;
use crate::tts::Synthesizer;
use crate::voices::{VoiceKind, VoiceProfile};

/// Sidecar configuration shipped with the ONNX models.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub audio: AudioConfig,
    pub espeak: Option<EspeakConfig>,
    #[serde(default)]
    pub phoneme_id_map: HashMap<String, Vec<i64>>,
    /// Preset speaker ids for the built-in voices.
    #[serde(default)]
    pub speakers: HashMap<String, i64>,
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

/// Voice-conversion synthesis engine.
///
/// Runs a base synthesizer conditioned on a preset speaker, then for
/// cloned voices converts the tone color towards an embedding extracted
/// from the stored reference recording.
pub struct ConverterEngine {
    synthesizer: Mutex<Session>,
    converter: Mutex<Session>,
    speaker_encoder: Mutex<Session>,
    config: ModelConfig,
    inference: InferenceConfig,
}

impl ConverterEngine {
    pub fn new(model_dir: &Path) -> Result<Self, AppError> {
        let config_path = model_dir.join("config.json");
        if !config_path.exists() {
            return Err(AppError::Synthesis(format!(
                "Missing model config {} (run download-model first)",
                config_path.display()
            )));
        }
        let config: ModelConfig = serde_json::from_reader(File::open(&config_path)?)?;
        let inference = config.inference.clone().unwrap_or_default();

        Ok(Self {
            synthesizer: Mutex::new(load_session(&model_dir.join("synthesizer.onnx"))?),
            converter: Mutex::new(load_session(&model_dir.join("converter.onnx"))?),
            speaker_encoder: Mutex::new(load_session(&model_dir.join("speaker_encoder.onnx"))?),
            config,
            inference,
        })
    }

    fn espeak_voice(&self) -> &str {
        self.config
            .espeak
            .as_ref()
            .map(|e| e.voice.as_str())
            .unwrap_or("en")
    }

    fn preset_speaker(&self, id: &str) -> Result<i64, AppError> {
        self.config
            .speakers
            .get(id)
            .copied()
            .ok_or_else(|| AppError::Synthesis(format!("No preset speaker for voice '{}'", id)))
    }

    fn base_speaker(&self) -> i64 {
        self.config.speakers.get("default").copied().unwrap_or(0)
    }

    fn run_synthesizer(&self, phoneme_ids: &[i64], sid: i64, speed: f32) -> Result<Vec<f32>, AppError> {
        if phoneme_ids.is_empty() {
            return Ok(Vec::new());
        }

        let input_len = phoneme_ids.len();

        // input: [batch, sequence] = [1, phoneme_count]
        let input_value = Value::from_array((vec![1, input_len], phoneme_ids.to_vec()))
            .map_err(|e| AppError::Synthesis(format!("Failed to create input tensor: {}", e)))?;

        // input_lengths: [batch] = [1]
        let lengths_value = Value::from_array((vec![1], vec![input_len as i64]))
            .map_err(|e| AppError::Synthesis(format!("Failed to create lengths tensor: {}", e)))?;

        // scales: [3] = [noise_scale, length_scale, noise_w]; speed shortens
        // or stretches the length scale
        let scales_value = Value::from_array((
            vec![3],
            vec![
                self.inference.noise_scale,
                self.inference.length_scale / speed,
                self.inference.noise_w,
            ],
        ))
        .map_err(|e| AppError::Synthesis(format!("Failed to create scales tensor: {}", e)))?;

        // sid: [1]
        let sid_value = Value::from_array((vec![1], vec![sid]))
            .map_err(|e| AppError::Synthesis(format!("Failed to create speaker tensor: {}", e)))?;

        let mut session = self.synthesizer.lock().unwrap();
        let outputs = session
            .run(ort::inputs![input_value, lengths_value, scales_value, sid_value])
            .map_err(|e| AppError::Synthesis(format!("Synthesis inference failed: {}", e)))?;

        extract_audio(&outputs)
    }

    fn embed_speaker(&self, reference: &[f32]) -> Result<Vec<f32>, AppError> {
        let input_value = Value::from_array((vec![1, reference.len()], reference.to_vec()))
            .map_err(|e| AppError::Synthesis(format!("Failed to create reference tensor: {}", e)))?;

        let mut session = self.speaker_encoder.lock().unwrap();
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| AppError::Synthesis(format!("Speaker encoding failed: {}", e)))?;

        let output = outputs
            .get("embedding")
            .ok_or_else(|| AppError::Synthesis("Missing embedding tensor".to_string()))?;
        let view = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Synthesis(format!("Failed to extract embedding: {}", e)))?;

        Ok(view.1.iter().copied().collect())
    }

    fn convert_tone(&self, samples: &[f32], embedding: &[f32]) -> Result<Vec<f32>, AppError> {
        let audio_value = Value::from_array((vec![1, samples.len()], samples.to_vec()))
            .map_err(|e| AppError::Synthesis(format!("Failed to create audio tensor: {}", e)))?;
        let embedding_value = Value::from_array((vec![1, embedding.len()], embedding.to_vec()))
            .map_err(|e| AppError::Synthesis(format!("Failed to create embedding tensor: {}", e)))?;

        let mut session = self.converter.lock().unwrap();
        let outputs = session
            .run(ort::inputs![audio_value, embedding_value])
            .map_err(|e| AppError::Synthesis(format!("Voice conversion failed: {}", e)))?;

        extract_audio(&outputs)
    }
}

impl Synthesizer for ConverterEngine {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
        speed: f32,
    ) -> Result<Vec<f32>, AppError> {
        let phonemes = phonemize(text, self.espeak_voice())?;
        let ids = phonemes_to_ids(&phonemes, &self.config.phoneme_id_map);

        match voice.kind {
            VoiceKind::Base => {
                let sid = self.preset_speaker(&voice.id)?;
                self.run_synthesizer(&ids, sid, speed)
            }
            VoiceKind::Custom => {
                let reference_path = voice.reference_audio.as_deref().ok_or_else(|| {
                    AppError::Synthesis(format!("Voice '{}' has no reference recording", voice.id))
                })?;
                let (reference, _) = audio::load_wav(reference_path)?;

                let base = self.run_synthesizer(&ids, self.base_speaker(), speed)?;
                let embedding = self.embed_speaker(&reference)?;
                self.convert_tone(&base, &embedding)
            }
        }
    }

    fn sample_rate(&self) -> u32 {
        self.config.audio.sample_rate
    }
}

fn load_session(path: &Path) -> Result<Session, AppError> {
    Session::builder()
        .map_err(|e| AppError::Synthesis(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| AppError::Synthesis(format!("Failed to set optimization level: {}", e)))?
        .with_intra_threads(4)
        .map_err(|e| AppError::Synthesis(format!("Failed to set threads: {}", e)))?
        .commit_from_file(path)
        .map_err(|e| AppError::Synthesis(format!("Failed to load {}: {}", path.display(), e)))
}

fn extract_audio(outputs: &ort::session::SessionOutputs) -> Result<Vec<f32>, AppError> {
    let output = outputs
        .get("output")
        .or_else(|| outputs.get("audio"))
        .ok_or_else(|| AppError::Synthesis("Missing output tensor".to_string()))?;

    let view = output
        .try_extract_tensor::<f32>()
        .map_err(|e| AppError::Synthesis(format!("Failed to extract output tensor: {}", e)))?;

    Ok(view.1.iter().copied().collect())
}

/// Convert text to phonemes using espeak-ng
pub fn phonemize(text: &str, voice: &str) -> Result<String, AppError> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let output = Command::new("espeak-ng")
        .args(["--ipa", "-q", "-v", voice, text])
        .output()
        .map_err(|e| {
            AppError::Synthesis(format!("Failed to run espeak-ng (is it installed?): {}", e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Synthesis(format!("espeak-ng failed: {}", stderr)));
    }

    let phonemes = String::from_utf8_lossy(&output.stdout).trim().to_string();

    Ok(phonemes)
}

/// Convert phonemes to IDs using the model's phoneme map
pub fn phonemes_to_ids(phonemes: &str, id_map: &HashMap<String, Vec<i64>>) -> Vec<i64> {
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
