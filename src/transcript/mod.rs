//! Transcript fetching.
//!
//! Produces the `<video_id>_subtitle.txt` files the pipeline consumes.

mod youtube;

pub use youtube::{extract_video_id, parse_json3, YtDlpSource};

use crate::error::{Result, SubtransError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One caption line with its start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionLine {
    pub start_seconds: f64,
    pub text: String,
}

impl CaptionLine {
    pub fn new(start_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            text: text.into(),
        }
    }
}

/// Trait for caption providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch captions for a video, trying languages in order.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<CaptionLine>>;
}

/// Format seconds as `HH:MM:SS`, flooring fractions.
pub fn format_time(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// File name for a saved transcript.
pub fn subtitle_file_name(video_id: &str, include_timecode: bool) -> String {
    let suffix = if include_timecode { "_with_timecode" } else { "" };
    format!("{}_subtitle{}.txt", video_id, suffix)
}

/// Render captions one per line, optionally prefixed with `[HH:MM:SS] `.
pub fn render_captions(lines: &[CaptionLine], include_timecode: bool) -> String {
    let mut output = String::new();
    for line in lines {
        if include_timecode {
            output.push_str(&format!("[{}] ", format_time(line.start_seconds)));
        }
        output.push_str(&line.text);
        output.push('\n');
    }
    output
}

/// Fetch a video's captions and write them into `dir`.
#[instrument(skip(source, languages, dir))]
pub async fn save_transcript(
    source: &dyn TranscriptSource,
    video_id: &str,
    languages: &[String],
    dir: &Path,
    include_timecode: bool,
) -> Result<PathBuf> {
    if languages.is_empty() {
        return Err(SubtransError::InvalidInput(
            "at least one caption language is required".to_string(),
        ));
    }

    let lines = source.fetch(video_id, languages).await?;
    if lines.is_empty() {
        return Err(SubtransError::TranscriptFetch(format!(
            "no captions found for {} in {}",
            video_id,
            languages.join(", ")
        )));
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(subtitle_file_name(video_id, include_timecode));
    std::fs::write(&path, render_captions(&lines, include_timecode))?;

    info!("Saved {} caption lines to {:?}", lines.len(), path);
    Ok(path)
}
