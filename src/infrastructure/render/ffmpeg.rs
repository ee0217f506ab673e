//! ffmpeg-backed video encoder

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::domain::render::{RenderJob, RenderedVideo, VideoEncoder, write_srt};
use crate::domain::DomainError;

const FRAME_RATE: u32 = 30;
const STDERR_TAIL_CHARS: usize = 400;

/// Runs ffmpeg with an argument vector; nothing goes through a shell
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: String,
    output_dir: PathBuf,
    image_secs: u32,
}

impl FfmpegEncoder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            output_dir: output_dir.into(),
            image_secs: 3,
        }
    }

    pub fn with_ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    pub fn with_image_secs(mut self, secs: u32) -> Self {
        self.image_secs = secs.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Arguments for one render. Pure: touches neither the filesystem nor a process.
    pub fn build_args(&self, job: &RenderJob, srt: Option<&Path>, output: &Path) -> Vec<OsString> {
        let mut args = vec![os("-y"), os("-loglevel"), os("error")];
        let (w, h) = (job.width, job.height);

        let video_inputs = if job.images.is_empty() {
            args.extend([
                os("-f"),
                os("lavfi"),
                os("-i"),
                os(format!("color=c=black:s={}x{}:r={}", w, h, FRAME_RATE)),
            ]);
            1
        } else {
            for image in &job.images {
                args.extend([
                    os("-loop"),
                    os("1"),
                    os("-t"),
                    os(self.image_secs.to_string()),
                    os("-i"),
                    os(image),
                ]);
            }
            job.images.len()
        };

        let audio_index = video_inputs;
        args.extend([os("-i"), os(&job.audio_path)]);

        if let Some(music) = &job.background_music {
            args.extend([os("-i"), os(music)]);
        }

        let mut filters = Vec::new();
        if job.images.is_empty() {
            filters.push("[0:v]setsar=1[base]".to_string());
        } else {
            let mut labels = String::new();
            for i in 0..video_inputs {
                filters.push(format!(
                    "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1,fps={FRAME_RATE}[img{i}]"
                ));
                labels.push_str(&format!("[img{i}]"));
            }
            filters.push(format!("{labels}concat=n={video_inputs}:v=1:a=0[base]"));
        }

        match srt {
            Some(path) => filters.push(format!(
                "[base]subtitles=filename='{}'[v]",
                escape_filter_value(&path.to_string_lossy())
            )),
            None => filters.push("[base]null[v]".to_string()),
        }

        let audio_map = if job.background_music.is_some() {
            filters.push(format!(
                "[{}:a][{}:a]amix=inputs=2:duration=first:dropout_transition=3[aout]",
                audio_index,
                audio_index + 1
            ));
            "[aout]".to_string()
        } else {
            format!("{}:a", audio_index)
        };

        args.extend([
            os("-filter_complex"),
            os(filters.join(";")),
            os("-map"),
            os("[v]"),
            os("-map"),
            os(audio_map),
        ]);
        args.extend(
            [
                "-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p", "-c:a", "aac",
                "-b:a", "192k", "-shortest",
            ]
            .map(os),
        );
        args.push(os(output));

        args
    }
}

fn os(value: impl AsRef<OsStr>) -> OsString {
    value.as_ref().to_os_string()
}

/// Escapes a value embedded in a quoted filtergraph option
fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':' | ',' | ';' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn tail(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    match text.char_indices().nth(count - max_chars) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    #[instrument(skip(self, job), fields(output = %job.output_name))]
    async fn render(&self, job: &RenderJob) -> Result<RenderedVideo, DomainError> {
        job.validate()?;
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let output = self.output_dir.join(&job.output_name);
        let srt = if job.subtitles.is_empty() {
            None
        } else {
            let path = output.with_extension("srt");
            write_srt(&path, &job.subtitles).await?;
            Some(path)
        };

        let args = self.build_args(job, srt.as_deref(), &output);
        debug!(args = ?args, "Running ffmpeg");

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DomainError::render(format!("Failed to spawn ffmpeg: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DomainError::render(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                tail(stderr.trim(), STDERR_TAIL_CHARS)
            )));
        }

        info!(path = %output.display(), "Video rendered");
        Ok(RenderedVideo::new(output))
    }
}
