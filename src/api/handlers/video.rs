//! Video render endpoint

use std::path::{Path, PathBuf};

use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, VideoRequest, VideoResponse};
use crate::domain::render::{RenderJob, is_plain_file_name};

/// Maps a file reference onto `dir`, rejecting anything but a plain file name
fn resolve(dir: &Path, reference: &str, param: &str) -> Result<PathBuf, ApiError> {
    let name = reference.trim();
    let name = name.strip_prefix("/audio/").unwrap_or(name);

    if !is_plain_file_name(name) {
        return Err(ApiError::bad_request(format!("Invalid file reference '{}'", reference))
            .with_param(param));
    }

    Ok(dir.join(name))
}

fn output_name(requested: Option<&str>) -> Result<String, ApiError> {
    let name = match requested.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) if name.ends_with(".mp4") => name.to_string(),
        Some(name) => format!("{}.mp4", name),
        None => return Ok(format!("short_{}.mp4", Uuid::new_v4().simple())),
    };

    if !is_plain_file_name(&name) {
        return Err(ApiError::bad_request("Output name must be a plain file name")
            .with_param("output_name"));
    }

    Ok(name)
}

/// POST /api/video
pub async fn create_video(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    let dirs = &state.media;

    let audio_path = resolve(&dirs.audio, &request.audio_url, "audio_url")?;
    if !audio_path.is_file() {
        return Err(ApiError::not_found("Audio file not found").with_param("audio_url"));
    }

    let images = request
        .images
        .iter()
        .map(|image| resolve(&dirs.media, image, "images"))
        .collect::<Result<Vec<_>, _>>()?;

    let mut job = RenderJob::new(audio_path, output_name(request.output_name.as_deref())?)
        .with_images(images)
        .with_subtitles(request.subtitles);

    let (width, height) = state.pipeline.frame_size();
    job = job.with_size(width, height);

    if let Some(music) = request.background_music.as_deref() {
        job = job.with_background_music(resolve(&dirs.media, music, "background_music")?);
    }

    let video = state.pipeline.render(&job).await?;

    info!(file = %video.file_name, "Video created");

    Ok(Json(VideoResponse {
        success: true,
        video_url: format!("/videos/{}", video.file_name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_accepts_tts_urls_and_names() {
        let dir = Path::new("/srv/audio");
        assert_eq!(
            resolve(dir, "/audio/abc.mp3", "audio_url").unwrap(),
            PathBuf::from("/srv/audio/abc.mp3")
        );
        assert_eq!(
            resolve(dir, "abc.mp3", "audio_url").unwrap(),
            PathBuf::from("/srv/audio/abc.mp3")
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = Path::new("/srv/audio");
        assert!(resolve(dir, "/audio/../../etc/passwd", "audio_url").is_err());
        assert!(resolve(dir, "/etc/passwd", "audio_url").is_err());
        assert!(resolve(dir, "..", "audio_url").is_err());
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(Some("clip")).unwrap(), "clip.mp4");
        assert_eq!(output_name(Some("clip.mp4")).unwrap(), "clip.mp4");
        assert!(output_name(None).unwrap().starts_with("short_"));
        assert!(output_name(Some("../clip")).is_err());
    }
}
