use std::num::NonZeroU32;
use std::path::Path;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;

use crate::error::AppError;
use crate::llm::{format_chat_prompt, ChatMessage, Generation, TextGenerator};

/// Text-generation engine backed by a local GGUF model.
pub struct LlamaGenerator {
    backend: LlamaBackend,
    model: LlamaModel,
    model_id: String,
    n_ctx: u32,
}

impl LlamaGenerator {
    pub fn load(
        model_path: &Path,
        model_id: &str,
        device: &str,
        n_ctx: u32,
    ) -> Result<Self, AppError> {
        if !model_path.exists() {
            return Err(AppError::Generation(format!(
                "Model file {} not found (run download-model first)",
                model_path.display()
            )));
        }

        tracing::info!("Loading model: {}", model_path.display());
        tracing::info!("Device: {}", device);

        let backend = LlamaBackend::init()
            .map_err(|e| AppError::Generation(format!("Failed to init llama backend: {}", e)))?;

        let mut params = LlamaModelParams::default();
        if device == "cuda" {
            // Offload every layer; llama.cpp caps this at the model depth
            params = params.with_n_gpu_layers(u32::MAX);
        }

        let model = LlamaModel::load_from_file(&backend, model_path, &params)
            .map_err(|e| AppError::Generation(format!("Failed to load model: {}", e)))?;

        tracing::info!("Model loaded successfully");

        Ok(Self {
            backend,
            model,
            model_id: model_id.to_string(),
            n_ctx,
        })
    }

    fn build_sampler(&self, temperature: f32) -> LlamaSampler {
        if temperature > 0.0 {
            LlamaSampler::chain_simple([
                LlamaSampler::top_p(0.95, 1),
                LlamaSampler::temp(temperature),
                LlamaSampler::dist(rand::random()),
            ])
        } else {
            LlamaSampler::greedy()
        }
    }
}

impl TextGenerator for LlamaGenerator {
    fn generate(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Generation, AppError> {
        let prompt = format_chat_prompt(messages);

        let tokens = self
            .model
            .str_to_token(&prompt, AddBos::Always)
            .map_err(|e| AppError::Generation(format!("Tokenization failed: {}", e)))?;
        if tokens.is_empty() {
            return Err(AppError::Generation("Prompt produced no tokens".to_string()));
        }

        let required = tokens.len() as u32 + max_tokens;
        if required > self.n_ctx {
            return Err(AppError::BadRequest(format!(
                "Prompt length ({}) plus max_tokens exceeds context size ({})",
                tokens.len(),
                self.n_ctx
            )));
        }

        let ctx_params = LlamaContextParams::default().with_n_ctx(NonZeroU32::new(self.n_ctx));
        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .map_err(|e| AppError::Generation(format!("Failed to create context: {}", e)))?;

        // Feed the whole prompt, requesting logits for the last token only
        let mut batch = LlamaBatch::new(self.n_ctx as usize, 1);
        let last_index = tokens.len() - 1;
        for (i, token) in tokens.iter().copied().enumerate() {
            batch
                .add(token, i as i32, &[0], i == last_index)
                .map_err(|e| AppError::Generation(format!("Batch add failed: {}", e)))?;
        }
        ctx.decode(&mut batch)
            .map_err(|e| AppError::Generation(format!("Prompt decode failed: {}", e)))?;

        let mut sampler = self.build_sampler(temperature);
        let mut text = String::new();
        let mut completion_tokens = 0u32;
        let mut n_cur = tokens.len() as i32;
        let budget = n_cur + max_tokens as i32;
        let mut finish_reason = "stop".to_string();

        while n_cur < budget {
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            if self.model.is_eog_token(token) {
                break;
            }

            let piece = self
                .model
                .token_to_str(token, Special::Plaintext)
                .map_err(|e| AppError::Generation(format!("Detokenization failed: {}", e)))?;
            text.push_str(&piece);
            completion_tokens += 1;

            batch.clear();
            batch
                .add(token, n_cur, &[0], true)
                .map_err(|e| AppError::Generation(format!("Batch add failed: {}", e)))?;
            n_cur += 1;
            ctx.decode(&mut batch)
                .map_err(|e| AppError::Generation(format!("Decode failed: {}", e)))?;
        }

        if n_cur >= budget {
            finish_reason = "length".to_string();
        }

        Ok(Generation {
            text: text.trim().to_string(),
            prompt_tokens: tokens.len() as u32,
            completion_tokens,
            finish_reason,
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
