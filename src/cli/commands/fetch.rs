//! Fetch command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{extract_video_id, save_transcript, YtDlpSource};
use anyhow::{anyhow, Result};

/// Download captions for a video into the working directory.
pub async fn run_fetch(
    video: &str,
    languages: Option<Vec<String>>,
    timecode: bool,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Fetch)?;

    let video_id = extract_video_id(video)
        .ok_or_else(|| anyhow!("Not a YouTube URL or video ID: {}", video))?;
    let languages = languages.unwrap_or_else(|| settings.fetch.languages.clone());
    let include_timecode = timecode || settings.fetch.include_timecode;

    let temp_dir = tempfile::tempdir()?;
    let source = YtDlpSource::new(temp_dir.path());

    let spinner = Output::spinner(&format!("Fetching captions for {}...", video_id));
    let result = save_transcript(
        &source,
        &video_id,
        &languages,
        &settings.working_dir(),
        include_timecode,
    )
    .await;
    spinner.finish_and_clear();

    let path = result?;
    Output::success(&format!("Saved captions to {}", path.display()));

    Ok(())
}
