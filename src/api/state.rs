//! Application state for shared services

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{ShortPipeline, TextGenerator, Transcriber};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub text: Arc<dyn TextGenerator>,
    pub transcriber: Arc<dyn Transcriber>,
    /// Owns speech, audio storage, the encoder and the concurrency gate
    pub pipeline: ShortPipeline,
    pub media: Arc<MediaDirs>,
    pub started_at: DateTime<Utc>,
}

/// Directories served or read by the HTTP layer
#[derive(Debug, Clone)]
pub struct MediaDirs {
    pub audio: PathBuf,
    pub videos: PathBuf,
    pub media: PathBuf,
}

impl AppState {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        transcriber: Arc<dyn Transcriber>,
        pipeline: ShortPipeline,
        media: MediaDirs,
    ) -> Self {
        Self {
            text,
            transcriber,
            pipeline,
            media: Arc::new(media),
            started_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("pipeline", &self.pipeline)
            .field("media", &self.media)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
