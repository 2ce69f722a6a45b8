//! One-shot downloader that fetches the generation model into the local
//! Hugging Face cache, so service startup never has to.

use std::io::{self, Write};

use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Cache, Repo, RepoType};
use tracing_subscriber::EnvFilter;

const GIB: f64 = (1024 * 1024 * 1024) as f64;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let model_id = std::env::var("MODEL_ID")
        .unwrap_or_else(|_| "bartowski/Llama-3.2-1B-Instruct-GGUF".to_string());
    let model_file = std::env::var("MODEL_FILE")
        .unwrap_or_else(|_| "Llama-3.2-1B-Instruct-Q4_K_M.gguf".to_string());
    let revision = std::env::var("MODEL_REVISION").unwrap_or_else(|_| "main".to_string());

    if std::env::var("HF_TOKEN").is_err() {
        tracing::warn!("HF_TOKEN not set; downloads from gated repositories will fail");
    }

    let cache = Cache::from_env();

    tracing::info!("Model Downloader");
    tracing::info!("Model: {} ({})", model_id, model_file);
    tracing::info!("Cache: {}", cache.path().display());

    print!("\nThis will download model files from the Hugging Face hub. Continue? (y/N): ");
    io::stdout().flush().ok();
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .expect("Failed to read input");
    if !answer.trim().eq_ignore_ascii_case("y") {
        tracing::info!("Download cancelled");
        return;
    }

    let mut builder = ApiBuilder::from_cache(cache);
    if let Ok(endpoint) = std::env::var("HF_ENDPOINT") {
        builder = builder.with_endpoint(endpoint);
    }
    let api = match builder.build() {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to initialize hub client: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Repo::with_revision(model_id.clone(), RepoType::Model, revision);
    tracing::info!("Downloading model files...");

    match api.repo(repo).get(&model_file) {
        Ok(path) => {
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            tracing::info!(
                "Model downloaded successfully! Total size: {:.2} GiB",
                size as f64 / GIB
            );
            tracing::info!("Model location: {}", path.display());
            tracing::info!("Start the server with MODEL_PATH={}", path.display());
        }
        Err(e) => {
            tracing::error!("Error downloading model: {}", e);
            std::process::exit(1);
        }
    }
}
