pub mod llama;
pub mod mock;

use serde::Deserialize;

use crate::error::AppError;

pub use llama::LlamaGenerator;
pub use mock::MockGenerator;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// One completed generation with token accounting.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub finish_reason: String,
}

/// Produces a chat completion. The real implementation wraps a local
/// llama model; the mock server injects a canned one.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Generation, AppError>;

    fn model_id(&self) -> &str;
}

pub struct GenerationService {
    engine: Box<dyn TextGenerator>,
}

impl GenerationService {
    pub fn new(engine: Box<dyn TextGenerator>) -> Self {
        Self { engine }
    }

    pub fn generate(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Generation, AppError> {
        self.engine.generate(messages, max_tokens, temperature)
    }

    pub fn model_id(&self) -> &str {
        self.engine.model_id()
    }
}

/// Format chat messages into the Llama 3 instruction template, ending
/// with an open assistant turn. The tokenizer adds BOS.
pub fn format_chat_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();

    for message in messages {
        let role = message.role.to_lowercase();
        prompt.push_str("<|start_header_id|>");
        prompt.push_str(&role);
        prompt.push_str("<|end_header_id|>\n\n");
        prompt.push_str(&message.content);
        prompt.push_str("<|eot_id|>");
    }

    prompt.push_str("<|start_header_id|>assistant<|end_header_id|>\n\n");
    prompt
}
