//! Video rendering - narration, images and captions into a vertical short

mod job;
mod subtitle;

pub use job::{
    DEFAULT_HEIGHT, DEFAULT_WIDTH, RenderJob, RenderedVideo, VideoEncoder, is_plain_file_name,
};
pub use subtitle::{SubtitleCue, format_srt_time, render_srt, write_srt};

#[cfg(test)]
pub use job::mock::MockVideoEncoder;
