use std::path::PathBuf;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn port_from(key: &str, default: &str) -> u16 {
    env_or(key, default)
        .parse()
        .unwrap_or_else(|_| panic!("{} must be a number", key))
}

/// Configuration for the TTS service.
pub struct TtsConfig {
    pub host: String,
    pub port: u16,
    pub voices_dir: PathBuf,
    pub model_dir: PathBuf,
}

impl TtsConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: port_from("TTS_PORT", "6000"),
            voices_dir: env_or("CUSTOM_VOICES_PATH", "./voices").into(),
            model_dir: env_or("TTS_MODEL_DIR", "./models/tts").into(),
        }
    }
}

/// Configuration for the text-generation service.
pub struct LlmConfig {
    pub host: String,
    pub port: u16,
    /// Reported model identity, also the hub repo for `download-model`.
    pub model_id: String,
    /// Local GGUF file to load.
    pub model_path: PathBuf,
    pub device: String,
    pub n_ctx: u32,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: port_from("SERVE_PORT", "5000"),
            model_id: env_or("MODEL_ID", "bartowski/Llama-3.2-1B-Instruct-GGUF"),
            model_path: env_or("MODEL_PATH", "./models/llm/model.gguf").into(),
            device: env_or("DEVICE", "cpu"),
            n_ctx: env_or("N_CTX", "4096")
                .parse()
                .expect("N_CTX must be a number"),
        }
    }
}
