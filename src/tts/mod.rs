pub mod engine;
pub mod mock;

use std::path::PathBuf;

use crate::audio;
use crate::error::AppError;
use crate::voices::{VoiceProfile, VoiceStore};

pub use engine::ConverterEngine;
pub use mock::SilentSynthesizer;

/// Turns text into audio samples for a resolved voice.
///
/// The real implementation wraps the ONNX synthesis models; the mock
/// server injects a silent one.
pub trait Synthesizer: Send + Sync {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
        speed: f32,
    ) -> Result<Vec<f32>, AppError>;

    fn sample_rate(&self) -> u32;
}

pub struct TtsService {
    engine: Box<dyn Synthesizer>,
    voices: VoiceStore,
}

impl TtsService {
    pub fn new(engine: Box<dyn Synthesizer>, voices_dir: PathBuf) -> Result<Self, AppError> {
        let voices = VoiceStore::new(voices_dir)?;
        Ok(Self { engine, voices })
    }

    pub fn speak(&self, text: &str, voice_id: &str, speed: f32) -> Result<Vec<u8>, AppError> {
        // 1. Resolve the voice
        let voice = self.voices.resolve(voice_id)?;

        // 2. Synthesize
        let samples = self.engine.synthesize(text, &voice, speed)?;

        // 3. Encode WAV
        let wav = audio::encode_wav(&samples, self.engine.sample_rate())?;

        Ok(wav)
    }

    pub fn voices(&self) -> &VoiceStore {
        &self.voices
    }
}
