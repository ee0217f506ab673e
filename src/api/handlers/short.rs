//! One-shot short generation endpoint

use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ShortRequest};
use crate::domain::ShortOutcome;

#[derive(Debug, Serialize)]
pub struct ShortResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(flatten)]
    pub outcome: ShortOutcome,
}

impl From<ShortOutcome> for ShortResponse {
    fn from(outcome: ShortOutcome) -> Self {
        Self {
            success: true,
            audio_url: outcome
                .audio
                .as_ref()
                .map(|narration| format!("/audio/{}", narration.audio.file_name)),
            video_url: outcome
                .video
                .as_ref()
                .map(|video| format!("/videos/{}", video.file_name)),
            outcome,
        }
    }
}

/// POST /api/short
pub async fn create_short(
    State(state): State<AppState>,
    Json(request): Json<ShortRequest>,
) -> Result<Json<ShortResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("No prompt provided").with_param("prompt"));
    }

    let outcome = state
        .pipeline
        .run(&request.prompt, request.correlation_id)
        .await?;

    Ok(Json(outcome.into()))
}
