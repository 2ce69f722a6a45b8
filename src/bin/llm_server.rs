use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voice_services::api::routes::{llm_router, LlmState};
use voice_services::config::LlmConfig;
use voice_services::llm::{GenerationService, LlamaGenerator};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = LlmConfig::from_env();

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("LLM Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Model: {}", config.model_id);

    // Load the model up front; requests never trigger loading
    let engine = match LlamaGenerator::load(
        &config.model_path,
        &config.model_id,
        &config.device,
        config.n_ctx,
    ) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to load model: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(LlmState {
        llm: GenerationService::new(Box::new(engine)),
    });
    let app = llm_router(state);

    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
