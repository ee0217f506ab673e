//! Render job and encoder seam

use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use super::SubtitleCue;
use crate::domain::DomainError;

pub const DEFAULT_WIDTH: u32 = 1080;
pub const DEFAULT_HEIGHT: u32 = 1920;

/// Everything needed to turn narration into a vertical video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub audio_path: PathBuf,
    pub images: Vec<PathBuf>,
    pub background_music: Option<PathBuf>,
    pub subtitles: Vec<SubtitleCue>,
    pub width: u32,
    pub height: u32,
    pub output_name: String,
}

impl RenderJob {
    pub fn new(audio_path: impl Into<PathBuf>, output_name: impl Into<String>) -> Self {
        Self {
            audio_path: audio_path.into(),
            images: Vec::new(),
            background_music: None,
            subtitles: Vec::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            output_name: output_name.into(),
        }
    }

    pub fn with_images(mut self, images: Vec<PathBuf>) -> Self {
        self.images = images;
        self
    }

    pub fn with_background_music(mut self, path: impl Into<PathBuf>) -> Self {
        self.background_music = Some(path.into());
        self
    }

    pub fn with_subtitles(mut self, subtitles: Vec<SubtitleCue>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Checks inputs before any process is spawned
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_plain_file_name(&self.output_name) {
            return Err(DomainError::validation(format!(
                "Output name '{}' must be a plain file name",
                self.output_name
            )));
        }

        if self.width == 0 || self.height == 0 {
            return Err(DomainError::validation("Video dimensions must be non-zero"));
        }

        if !self.audio_path.is_file() {
            return Err(DomainError::validation(format!(
                "Audio file not found: {}",
                self.audio_path.display()
            )));
        }

        for image in &self.images {
            if !image.is_file() {
                return Err(DomainError::validation(format!(
                    "Image not found: {}",
                    image.display()
                )));
            }
        }

        if let Some(music) = &self.background_music
            && !music.is_file()
        {
            return Err(DomainError::validation(format!(
                "Background music not found: {}",
                music.display()
            )));
        }

        self.subtitles.iter().try_for_each(SubtitleCue::validate)
    }
}

/// A single normal path component: no separators, no `.` or `..`
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// A finished video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedVideo {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
}

impl RenderedVideo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { file_name, path }
    }
}

/// Renders a job into a video file
#[async_trait]
pub trait VideoEncoder: Send + Sync + Debug {
    async fn render(&self, job: &RenderJob) -> Result<RenderedVideo, DomainError>;
}
