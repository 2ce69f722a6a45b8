use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::routes::TtsState;
use super::{CloneResponse, DeleteResponse, HealthResponse, TtsRequest, VoicesResponse};
use crate::error::AppError;
use crate::voices::VoiceKind;

pub async fn speak(
    State(state): State<Arc<TtsState>>,
    Json(request): Json<TtsRequest>,
) -> Result<Response, AppError> {
    // Validate input
    if request.text.is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".into()));
    }

    if request.text.len() > 10000 {
        return Err(AppError::BadRequest(
            "Text too long (max 10000 chars)".into(),
        ));
    }

    if request.voice.is_empty() {
        return Err(AppError::BadRequest("Voice cannot be empty".into()));
    }

    if !request.speed.is_finite() || request.speed <= 0.0 {
        return Err(AppError::BadRequest("Speed must be positive".into()));
    }

    // Audio is served as WAV only
    if !request.format.eq_ignore_ascii_case("wav") {
        return Err(AppError::BadRequest(format!(
            "Unsupported audio format: {}",
            request.format
        )));
    }

    // Generate audio
    let wav = state.tts.speak(&request.text, &request.voice, request.speed)?;

    // Return audio response
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"speech.wav\"",
            ),
        ],
        wav,
    )
        .into_response())
}

pub async fn list_voices(
    State(state): State<Arc<TtsState>>,
) -> Result<Json<VoicesResponse>, AppError> {
    let voices = state.tts.voices().list();
    Ok(Json(VoicesResponse { voices }))
}

pub async fn clone_voice(
    State(state): State<Arc<TtsState>>,
    mut multipart: Multipart,
) -> Result<Json<CloneResponse>, AppError> {
    let mut audio = None;
    let mut name = None;
    let mut description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "audioFile" => {
                audio = Some(field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read upload: {}", e))
                })?);
            }
            "name" => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read name field: {}", e))
                })?);
            }
            "description" => {
                description = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read description field: {}", e))
                })?;
            }
            _ => {}
        }
    }

    let audio = audio.ok_or_else(|| AppError::BadRequest("No audio file provided".into()))?;
    let name = name.unwrap_or_else(|| "Custom Voice".to_string());

    let voice = state
        .tts
        .voices()
        .clone_voice(&audio, &name, &description)?;

    Ok(Json(CloneResponse {
        voice,
        status: "success".to_string(),
    }))
}

pub async fn get_voice(
    State(state): State<Arc<TtsState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let voice = state.tts.voices().resolve(&id)?;

    // This route addresses clones; built-ins are not served here
    if voice.kind == VoiceKind::Base {
        return Err(AppError::VoiceNotFound(id));
    }

    Ok(Json(voice).into_response())
}

pub async fn delete_voice(
    State(state): State<Arc<TtsState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.tts.voices().delete(&id)?;

    Ok(Json(DeleteResponse {
        status: "success".to_string(),
        message: "Voice deleted".to_string(),
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
