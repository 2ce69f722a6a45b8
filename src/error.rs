use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    #[error("Voice is built-in: {0}")]
    ReservedVoice(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::VoiceNotFound(v) => (
                StatusCode::NOT_FOUND,
                "VOICE_NOT_FOUND",
                format!("Voice '{}' not found", v),
            ),
            AppError::ReservedVoice(v) => (
                StatusCode::NOT_FOUND,
                "VOICE_RESERVED",
                format!("Voice '{}' is built-in and cannot be modified", v),
            ),
            AppError::InvalidAudio(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_AUDIO", msg.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Synthesis(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SYNTHESIS_ERROR",
                msg.clone(),
            ),
            AppError::Generation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_ERROR",
                msg.clone(),
            ),
            AppError::Storage(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Json(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "JSON_ERROR",
                e.to_string(),
            ),
        };

        tracing::error!("Request failed: {} - {}", code, message);

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
