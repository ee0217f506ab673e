//! Shorts gateway
//!
//! Short-video generation over resilient provider chains:
//! - Text generation, speech synthesis and transcription with ordered fallback and retries
//! - Narration caching on disk
//! - ffmpeg rendering and the end-to-end `/api/short` pipeline

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;

use api::state::{AppState, MediaDirs};
use domain::ShortPipeline;
use infrastructure::render::FfmpegEncoder;
use infrastructure::storage::FileAudioStore;
use infrastructure::ChainFactory;

/// Builds the chains, collaborators and media directories described by `config`
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let media = MediaDirs {
        audio: config.storage.audio_dir.clone(),
        videos: config.render.output_dir.clone(),
        media: config.storage.media_dir.clone(),
    };

    for dir in [&media.audio, &media.videos, &media.media] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let factory = ChainFactory::default();
    let text = Arc::new(factory.text_generation(&config.text_generation)?);
    let speech = Arc::new(factory.speech(&config.speech)?);
    let transcriber = Arc::new(factory.transcription(&config.transcription)?);

    let encoder = FfmpegEncoder::new(media.videos.clone())
        .with_ffmpeg_path(config.render.ffmpeg_path.clone())
        .with_image_secs(config.render.image_secs);

    let pipeline = ShortPipeline::new(
        text.clone(),
        speech,
        Arc::new(encoder),
        Arc::new(FileAudioStore::new(media.audio.clone())),
        config.pipeline.max_concurrent,
    )
    .with_frame_size(config.render.width, config.render.height);

    tracing::info!(
        text_providers = config.text_generation.providers.len(),
        speech_providers = config.speech.providers.len(),
        transcription_providers = config.transcription.providers.len(),
        max_concurrent = config.pipeline.max_concurrent,
        "Application state ready"
    );

    Ok(AppState::new(text, transcriber, pipeline, media))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_creates_media_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.audio_dir = dir.path().join("audio");
        config.storage.media_dir = dir.path().join("media");
        config.render.output_dir = dir.path().join("videos");

        let state = create_app_state(&config).await.unwrap();

        assert!(state.media.audio.is_dir());
        assert!(state.media.videos.is_dir());
        assert!(state.media.media.is_dir());
        assert_eq!(state.pipeline.frame_size(), (1080, 1920));
    }
}
