use crate::error::AppError;
use crate::llm::{ChatMessage, Generation, TextGenerator};

/// Model-free generator used by the mock server: keyword-matched canned
/// replies with whitespace token accounting.
pub struct MockGenerator {
    model_id: String,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            model_id: "mock-model".to_string(),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn canned_reply(last_message: &str) -> String {
    let lower = last_message.to_lowercase();

    if lower.contains("hello") || lower.contains("hi") {
        "Hello! I'm a voice assistant. How can I help you today?".to_string()
    } else if lower.contains("joke") {
        "Why don't programmers like nature? It has too many bugs!".to_string()
    } else if lower.contains("weather") {
        "I don't have access to real-time weather data, but I can help with plenty of other things.".to_string()
    } else if lower.contains("voice") || lower.contains("speech") {
        "I'm built to work with both voice and text input, though this is the model-free stand-in."
            .to_string()
    } else {
        format!(
            "I understand you said: '{}'. This is a canned reply from the mock generation service.",
            last_message
        )
    }
}

fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

impl TextGenerator for MockGenerator {
    fn generate(
        &self,
        messages: &[ChatMessage],
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<Generation, AppError> {
        let last = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let text = canned_reply(last);

        Ok(Generation {
            prompt_tokens: word_count(last),
            completion_tokens: word_count(&text),
            text,
            finish_reason: "stop".to_string(),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
