//! Script generation endpoint

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, GenerateRequest, GenerateResponse, Json};
use crate::domain::chain::ChainRequest;
use crate::domain::generation::{GenerationRequest, TEXT_GENERATION_CHAIN};

/// POST /api/generate (also mounted at /api/groq)
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Missing prompt").with_param("prompt"));
    }

    let mut input = GenerationRequest::new(prompt);
    input.system_prompt = request.system_prompt;
    input.max_tokens = request.max_tokens;
    input.temperature = request.temperature;

    let chain_request = match request.correlation_id {
        Some(id) => ChainRequest::new(input).with_correlation_id(id),
        None => ChainRequest::new(input),
    };

    info!(
        correlation_id = %chain_request.correlation_id(),
        prompt_chars = prompt.chars().count(),
        "Processing generation request"
    );

    let success = state
        .text
        .generate(&chain_request)
        .await
        .into_result(TEXT_GENERATION_CHAIN)?;

    Ok(Json(GenerateResponse {
        success: true,
        output: success.output,
        provider_used: success.provider_used,
        attempts_made: success.attempts_made,
        correlation_id: chain_request.correlation_id().to_string(),
    }))
}
