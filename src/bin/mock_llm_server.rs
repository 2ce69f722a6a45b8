//! Mock LLM server: the full HTTP surface, canned replies, no model.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voice_services::api::routes::{llm_router, LlmState};
use voice_services::config::LlmConfig;
use voice_services::llm::{GenerationService, MockGenerator};

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

    tracing::info!("Mock LLM Server v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(LlmState {
        llm: GenerationService::new(Box::new(MockGenerator::new())),
    });
    let app = llm_router(state);

    tracing::info!("Starting mock server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
