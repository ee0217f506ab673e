//! `/api` endpoints

pub mod generate;
pub mod short;
pub mod transcribe;
pub mod tts;
pub mod video;

use axum::{
    Router,
    routing::{get, post},
};

use super::health;
use super::state::AppState;

/// Create the `/api` router
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::generate))
        .route("/groq", post(generate::generate))
        .route("/tts", post(tts::synthesize))
        .route("/transcribe", post(transcribe::transcribe))
        .route("/video", post(video::create_video))
        .route("/short", post(short::create_short))
        .route("/status", get(health::status))
}
