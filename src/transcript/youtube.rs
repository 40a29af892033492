//! YouTube captions via yt-dlp.

use super::{CaptionLine, TranscriptSource};
use crate::error::{Result, SubtransError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Extract an 11-character video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let regex = Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.|m\.)?
            (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex");

    let caps = regex.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a yt-dlp `json3` caption file into caption lines.
///
/// Events without text (window markers, bare line breaks) are skipped and
/// line breaks inside one caption become spaces.
pub fn parse_json3(content: &str) -> Result<Vec<CaptionLine>> {
    let parsed: Json3 = serde_json::from_str(content).map_err(|e| {
        SubtransError::TranscriptFetch(format!("Failed to parse caption file: {}", e))
    })?;

    let lines = parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event
                .segs?
                .into_iter()
                .map(|seg| seg.utf8)
                .collect::<String>()
                .replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(CaptionLine::new(event.start_ms as f64 / 1000.0, text))
            }
        })
        .collect();

    Ok(lines)
}

/// Caption source that shells out to yt-dlp.
pub struct YtDlpSource {
    work_dir: PathBuf,
}

impl YtDlpSource {
    /// Create a source that downloads caption files into `work_dir`.
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// Locate the caption file yt-dlp wrote, preferring languages in order.
    fn find_caption_file(&self, video_id: &str, languages: &[String]) -> Option<PathBuf> {
        for lang in languages {
            let candidate = self.work_dir.join(format!("{}.{}.json3", video_id, lang));
            if candidate.exists() {
                return Some(candidate);
            }
        }

        // Fallback: regional variants such as en-US for en
        let entries = std::fs::read_dir(&self.work_dir).ok()?;
        let names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();

        for lang in languages {
            let prefix = format!("{}.{}-", video_id, lang);
            let mut matches: Vec<&String> = names
                .iter()
                .filter(|n| n.starts_with(&prefix) && n.ends_with(".json3"))
                .collect();
            matches.sort();
            if let Some(name) = matches.first() {
                return Some(self.work_dir.join(name.as_str()));
            }
        }
        None
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    #[instrument(skip(self, languages))]
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<CaptionLine>> {
        std::fs::create_dir_all(&self.work_dir)?;

        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = self.work_dir.join(format!("{}.%(ext)s", video_id));
        info!("Downloading captions from {}", url);

        let result = Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(languages.join(","))
            .arg("--sub-format").arg("json3")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SubtransError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(SubtransError::TranscriptFetch(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubtransError::TranscriptFetch(format!("yt-dlp failed: {stderr}")));
        }

        let path = self.find_caption_file(video_id, languages).ok_or_else(|| {
            SubtransError::TranscriptFetch(format!(
                "no captions available for {} in {}",
                video_id,
                languages.join(", ")
            ))
        })?;

        debug!("Parsing caption file {:?}", path);
        let content = std::fs::read_to_string(&path)?;
        parse_json3(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=zduSFxRajkE"),
            Some("zduSFxRajkE".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=zduSFxRajkE"),
            Some("zduSFxRajkE".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/zduSFxRajkE"),
            Some("zduSFxRajkE".to_string())
        );
        assert_eq!(extract_video_id("zduSFxRajkE"), Some("zduSFxRajkE".to_string()));

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_parse_json3() {
        let content = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 2000, "id": 1, "wpWinPosId": 1},
                {"tStartMs": 1200, "dDurationMs": 3000, "segs": [{"utf8": "Hello"}, {"utf8": " everyone", "tOffsetMs": 400}]},
                {"tStartMs": 3000, "aAppend": 1, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 65000, "segs": [{"utf8": "Let's\nbegin"}]}
            ]
        }"#;

        let lines = parse_json3(content).unwrap();
        assert_eq!(
            lines,
            vec![
                CaptionLine::new(1.2, "Hello everyone"),
                CaptionLine::new(65.0, "Let's begin"),
            ]
        );
    }

    #[test]
    fn test_parse_json3_rejects_garbage() {
        assert!(matches!(
            parse_json3("<html>"),
            Err(SubtransError::TranscriptFetch(_))
        ));
    }

    #[test]
    fn test_find_caption_file_prefers_language_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.ko.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.en.json3"), "{}").unwrap();

        let source = YtDlpSource::new(dir.path());
        let found = source
            .find_caption_file("abc", &["en".to_string(), "ko".to_string()])
            .unwrap();
        assert!(found.ends_with("abc.en.json3"));

        let found = source
            .find_caption_file("abc", &["fr".to_string(), "ko".to_string()])
            .unwrap();
        assert!(found.ends_with("abc.ko.json3"));
    }

    #[test]
    fn test_find_caption_file_ignores_unrequested_languages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.en.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.en-US.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.ko-KR.json3"), "{}").unwrap();

        let source = YtDlpSource::new(dir.path());
        assert_eq!(source.find_caption_file("abc", &["fr".to_string()]), None);

        let found = source.find_caption_file("abc", &["ko".to_string()]).unwrap();
        assert!(found.ends_with("abc.ko-KR.json3"));

        // "e" must not match "en"
        assert_eq!(source.find_caption_file("abc", &["e".to_string()]), None);
    }
}
