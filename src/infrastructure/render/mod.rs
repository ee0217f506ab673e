//! Video encoders

mod ffmpeg;

pub use ffmpeg::FfmpegEncoder;
