use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voice_services::api::routes::{tts_router, TtsState};
use voice_services::config::TtsConfig;
use voice_services::tts::{ConverterEngine, TtsService};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TtsConfig::from_env();

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("TTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Voices directory: {}", config.voices_dir.display());
    tracing::info!("Model directory: {}", config.model_dir.display());

    // Load the synthesis models up front; requests never trigger loading
    let engine = match ConverterEngine::new(&config.model_dir) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to load synthesis models: {}", e);
            std::process::exit(1);
        }
    };

    let tts = TtsService::new(Box::new(engine), config.voices_dir)
        .expect("Failed to open voices directory");

    let state = Arc::new(TtsState { tts });
    let app = tts_router(state);

    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
