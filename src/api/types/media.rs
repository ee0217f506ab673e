//! Request and response bodies of the `/api` endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::render::SubtitleCue;
use crate::domain::Transcript;

/// POST /api/generate
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub output: String,
    pub provider_used: String,
    pub attempts_made: u32,
    pub correlation_id: String,
}

/// POST /api/tts
#[derive(Debug, Clone, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechResponse {
    pub success: bool,
    pub audio_url: String,
    /// `None` when the clip came from the cache
    pub provider_used: Option<String>,
    pub attempts_made: u32,
    pub cached: bool,
    pub correlation_id: String,
}

/// POST /api/transcribe
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResponse {
    pub success: bool,
    pub output: String,
    /// False when no transcript field matched and `output` is a raw preview
    pub parsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub provider_used: String,
    pub attempts_made: u32,
    pub correlation_id: String,
}

impl TranscriptionResponse {
    pub fn new(
        transcript: &Transcript,
        provider_used: String,
        attempts_made: u32,
        correlation_id: String,
    ) -> Self {
        Self {
            success: true,
            output: transcript.text().to_string(),
            parsed: transcript.is_parsed(),
            field: transcript.field(),
            provider_used,
            attempts_made,
            correlation_id,
        }
    }
}

/// POST /api/video. Files are referenced by name, never by server path.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoRequest {
    /// `/audio/<file>` as returned by `/api/tts`, or a bare file name
    #[serde(default, alias = "audioUrl", alias = "audio_path")]
    pub audio_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub subtitles: Vec<SubtitleCue>,
    #[serde(default)]
    pub background_music: Option<String>,
    #[serde(default)]
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoResponse {
    pub success: bool,
    pub video_url: String,
}

/// POST /api/short
#[derive(Debug, Clone, Deserialize)]
pub struct ShortRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// GET /api/status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}
