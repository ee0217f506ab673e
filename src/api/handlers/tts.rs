//! Text-to-speech endpoint

use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SpeechResponse, TtsRequest};
use crate::domain::SpeechRequest;

/// POST /api/tts
pub async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Json<SpeechResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("Missing text").with_param("text"));
    }

    let correlation_id = request
        .correlation_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let speech = SpeechRequest {
        text: request.text,
        voice: request.voice,
    };

    let narration = state.pipeline.narrate(&speech, &correlation_id).await?;

    info!(
        correlation_id = %correlation_id,
        file = %narration.audio.file_name,
        cached = narration.audio.cached,
        "Speech ready"
    );

    Ok(Json(SpeechResponse {
        success: true,
        audio_url: format!("/audio/{}", narration.audio.file_name),
        provider_used: narration.provider_used,
        attempts_made: narration.attempts_made,
        cached: narration.audio.cached,
        correlation_id,
    }))
}
