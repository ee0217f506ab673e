//! Speech-to-text endpoint

use axum::extract::{Multipart, State};
use bytes::Bytes;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, TranscriptionResponse};
use crate::domain::chain::ChainRequest;
use crate::domain::transcription::{TRANSCRIPTION_CHAIN, TranscriptionRequest};

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "audio.mp3";

/// POST /api/transcribe with a multipart `file` field
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let mut upload: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        upload = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) = upload
        .ok_or_else(|| ApiError::bad_request("Missing audio file").with_param(FILE_FIELD))?;

    if bytes.is_empty() {
        return Err(ApiError::bad_request("Audio file is empty").with_param(FILE_FIELD));
    }

    let request = ChainRequest::new(TranscriptionRequest::new(bytes, file_name, content_type));

    info!(
        correlation_id = %request.correlation_id(),
        bytes = request.input().audio.len(),
        "Processing transcription request"
    );

    let success = state
        .transcriber
        .transcribe(&request)
        .await
        .into_result(TRANSCRIPTION_CHAIN)?;

    Ok(Json(TranscriptionResponse::new(
        &success.output,
        success.provider_used,
        success.attempts_made,
        request.correlation_id().to_string(),
    )))
}
