use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use super::routes::LlmState;
use super::{GenerateRequest, GenerateResponse, HealthResponse, ModelEntry, ModelsResponse, Usage};
use crate::error::AppError;

pub async fn generate(
    State(state): State<Arc<LlmState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::BadRequest("No messages provided".into()));
    }

    let generation = state
        .llm
        .generate(&request.messages, request.max_tokens, request.temperature)?;

    Ok(Json(GenerateResponse {
        text: generation.text,
        usage: Usage {
            prompt_tokens: generation.prompt_tokens,
            completion_tokens: generation.completion_tokens,
            total_tokens: generation.prompt_tokens + generation.completion_tokens,
        },
        finish_reason: generation.finish_reason,
    }))
}

pub async fn list_models(State(state): State<Arc<LlmState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        data: vec![ModelEntry {
            id: state.llm.model_id().to_string(),
            object: "model".to_string(),
            created: Utc::now().timestamp(),
            owned_by: "user".to_string(),
        }],
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
