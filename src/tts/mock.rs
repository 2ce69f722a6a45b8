use crate::error::AppError;
use crate::tts::Synthesizer;
use crate::voices::VoiceProfile;

/// Model-free synthesizer used by the mock server: always returns one
/// second of silence, whatever the text or voice.
pub struct SilentSynthesizer {
    sample_rate: u32,
}

impl SilentSynthesizer {
    pub fn new() -> Self {
        Self {
            sample_rate: 16_000,
        }
    }
}

impl Default for SilentSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for SilentSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
        _speed: f32,
    ) -> Result<Vec<f32>, AppError> {
        tracing::info!(
            "Mock synthesis for text: {}... (voice: {})",
            text.chars().take(30).collect::<String>(),
            voice.id
        );
        Ok(vec![0.0; self.sample_rate as usize])
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
