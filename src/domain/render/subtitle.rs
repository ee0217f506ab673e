//! SRT subtitle formatting

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const LINE_WIDTH: usize = 42;

/// One timed caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    #[serde(alias = "start")]
    pub start_secs: f64,
    #[serde(alias = "end")]
    pub end_secs: f64,
    pub text: String,
}

impl SubtitleCue {
    pub fn new(start_secs: f64, end_secs: f64, text: impl Into<String>) -> Self {
        Self {
            start_secs,
            end_secs,
            text: text.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.start_secs.is_finite() || !self.end_secs.is_finite() || self.start_secs < 0.0 {
            return Err(DomainError::validation(format!(
                "Subtitle '{}' has an invalid time range",
                self.text
            )));
        }

        if self.end_secs < self.start_secs {
            return Err(DomainError::validation(format!(
                "Subtitle '{}' ends before it starts",
                self.text
            )));
        }

        Ok(())
    }
}

/// `HH:MM:SS,mmm`
pub fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Render cues as an SRT document
pub fn render_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();

    for (i, cue) in cues.iter().enumerate() {
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs)
        );
        for line in wrap_text(&cue.text, LINE_WIDTH) {
            let _ = writeln!(out, "{}", line);
        }
        out.push('\n');
    }

    out
}

pub async fn write_srt(path: &Path, cues: &[SubtitleCue]) -> Result<(), DomainError> {
    tokio::fs::write(path, render_srt(cues)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(61.5), "00:01:01,500");
        assert_eq!(format_srt_time(3723.004), "01:02:03,004");
        assert_eq!(format_srt_time(-2.0), "00:00:00,000");
    }

    #[test]
    fn test_render_srt_numbers_and_wraps_cues() {
        let cues = vec![
            SubtitleCue::new(0.0, 1.25, "Hello"),
            SubtitleCue::new(
                1.25,
                4.0,
                "this caption is long enough that it has to wrap onto a second line",
            ),
        ];

        let srt = render_srt(&cues);
        let lines: Vec<&str> = srt.lines().collect();

        assert_eq!(lines[0], "1");
        assert_eq!(lines[1], "00:00:00,000 --> 00:00:01,250");
        assert_eq!(lines[2], "Hello");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "2");
        assert!(lines[6].chars().count() <= LINE_WIDTH);
        assert!(!lines[7].is_empty());
    }

    #[test]
    fn test_cue_validation() {
        assert!(SubtitleCue::new(1.0, 2.0, "ok").validate().is_ok());
        assert!(SubtitleCue::new(2.0, 1.0, "backwards").validate().is_err());
        assert!(SubtitleCue::new(f64::NAN, 1.0, "nan").validate().is_err());
    }

    #[test]
    fn test_cue_accepts_short_field_names() {
        let cue: SubtitleCue =
            serde_json::from_str(r#"{"start": 0.5, "end": 1.5, "text": "hi"}"#).unwrap();
        assert_eq!(cue, SubtitleCue::new(0.5, 1.5, "hi"));
    }
}
