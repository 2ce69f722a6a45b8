use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{llm as llm_handlers, tts as tts_handlers};
use crate::llm::GenerationService;
use crate::tts::TtsService;

/// Largest accepted reference-audio upload.
pub const MAX_CLONE_UPLOAD: usize = 25 * 1024 * 1024;

pub struct TtsState {
    pub tts: TtsService,
}

pub struct LlmState {
    pub llm: GenerationService,
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn tts_router(state: Arc<TtsState>) -> Router {
    Router::new()
        .route("/health", get(tts_handlers::health))
        .route("/voices", get(tts_handlers::list_voices))
        .route("/tts", post(tts_handlers::speak))
        .route("/clone", post(tts_handlers::clone_voice))
        .route(
            "/clone/:id",
            get(tts_handlers::get_voice).delete(tts_handlers::delete_voice),
        )
        .layer(DefaultBodyLimit::max(MAX_CLONE_UPLOAD))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn llm_router(state: Arc<LlmState>) -> Router {
    Router::new()
        .route("/health", get(llm_handlers::health))
        .route("/generate", post(llm_handlers::generate))
        .route("/models", get(llm_handlers::list_models))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
