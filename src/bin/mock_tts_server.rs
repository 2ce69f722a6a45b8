//! Mock TTS server: the full HTTP surface, silent audio, no models.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voice_services::api::routes::{tts_router, TtsState};
use voice_services::config::TtsConfig;
use voice_services::tts::{SilentSynthesizer, TtsService};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TtsConfig::from_env();

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("Mock TTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Voices directory: {}", config.voices_dir.display());

    let tts = TtsService::new(Box::new(SilentSynthesizer::new()), config.voices_dir)
        .expect("Failed to open voices directory");

    let state = Arc::new(TtsState { tts });
    let app = tts_router(state);

    tracing::info!("Starting mock server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
