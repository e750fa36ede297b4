//! YouTube transcript reader.
//!
//! Flow: reference → video id → watch page → caption track list → timed-text XML → segments.
//! Every `step`-th segment is kept and the kept lines are grouped into chunks of `chunk_size`.

use crate::html::decode_entities;
use crate::{request_error, ContentReader};
use async_trait::async_trait;
use bridge_core::ExtractionError;
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_CHUNK_SIZE: usize = 150;
/// Caption languages tried in order before falling back to the first track.
pub const DEFAULT_LANGUAGES: &[&str] = &["zh-TW", "zh", "ja", "zh-Hant", "zh-Hans", "en", "ko"];

const VIDEO_ID_LEN: usize = 11;

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extracts the 11-character video id from a bare id or any common YouTube URL shape.
pub fn video_id(reference: &str) -> Result<String, ExtractionError> {
    let reference = reference.trim();
    let invalid = || ExtractionError::InvalidReference(reference.to_string());
    if is_video_id(reference) {
        return Ok(reference.to_string());
    }

    let url = Url::parse(reference)
        .or_else(|_| Url::parse(&format!("https://{}", reference)))
        .map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    let host = host
        .trim_start_matches("www.")
        .trim_start_matches("m.")
        .trim_start_matches("music.");
    let mut segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
    segments.retain(|s| !s.is_empty());

    let candidate = match host {
        "youtu.be" => segments.first().map(|s| s.to_string()),
        "youtube.com" | "youtube-nocookie.com" => match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            ["shorts" | "embed" | "live" | "v", id, ..] => Some(id.to_string()),
            _ => None,
        },
        _ => None,
    };

    candidate.filter(|id| is_video_id(id)).ok_or_else(invalid)
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
}

/// Returns the JSON array that follows `"captionTracks":` in the watch page, if any.
fn caption_tracks_json(page: &str) -> Option<&str> {
    let key = "\"captionTracks\":";
    let start = page.find(key)? + key.len();
    let rest = &page[start..];
    if !rest.starts_with('[') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Segment texts from a timed-text XML document, entities decoded, blanks dropped.
fn parse_timedtext(xml: &str) -> Vec<String> {
    let document = Html::parse_document(xml);
    let Ok(selector) = Selector::parse("text") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| {
            let raw: String = el.text().collect();
            decode_entities(&raw)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Keeps every `step`-th segment and groups the kept lines into chunks of `chunk_size`.
pub(crate) fn sample_chunks(segments: &[String], step: usize, chunk_size: usize) -> Vec<String> {
    let kept: Vec<&str> = segments
        .iter()
        .step_by(step.max(1))
        .map(String::as_str)
        .collect();
    kept.chunks(chunk_size.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}

#[derive(Clone)]
pub struct YoutubeReader {
    client: reqwest::Client,
    base_url: String,
    step: usize,
    chunk_size: usize,
    languages: Vec<String>,
}

impl YoutubeReader {
    pub fn new(client: reqwest::Client, step: usize) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            step: step.max(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Points the reader at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    async fn fetch_text(&self, url: &str) -> Result<String, ExtractionError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.8")
            .send()
            .await
            .map_err(|e| request_error(url, e))?;
        if !response.status().is_success() {
            return Err(ExtractionError::Unreachable(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }
        response.text().await.map_err(|e| request_error(url, e))
    }

    fn pick_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        self.languages
            .iter()
            .find_map(|lang| tracks.iter().find(|t| &t.language_code == lang))
            .or_else(|| tracks.first())
    }

    /// Transcript of the video as chunks of sampled lines.
    #[instrument(skip(self))]
    pub async fn transcript_chunks(&self, reference: &str) -> Result<Vec<String>, ExtractionError> {
        let id = video_id(reference)?;
        let page = self
            .fetch_text(&format!("{}/watch?v={}", self.base_url, id))
            .await?;

        let Some(json) = caption_tracks_json(&page) else {
            warn!(video_id = %id, "No caption tracks on watch page");
            return Err(ExtractionError::NoTranscript(id));
        };
        let tracks: Vec<CaptionTrack> =
            serde_json::from_str(json).map_err(|e| ExtractionError::Parse(e.to_string()))?;
        let track = self
            .pick_track(&tracks)
            .ok_or_else(|| ExtractionError::NoTranscript(id.clone()))?;
        debug!(video_id = %id, language = %track.language_code, "step: caption track selected");

        let xml = self.fetch_text(&track.base_url).await?;
        let segments = parse_timedtext(&xml);
        if segments.is_empty() {
            return Err(ExtractionError::NoTranscript(id));
        }

        let chunks = sample_chunks(&segments, self.step, self.chunk_size);
        info!(
            video_id = %id,
            segments = segments.len(),
            chunks = chunks.len(),
            step = self.step,
            "Transcript extracted"
        );
        Ok(chunks)
    }
}

#[async_trait]
impl ContentReader for YoutubeReader {
    async fn extract(&self, reference: &str) -> Result<String, ExtractionError> {
        Ok(self.transcript_chunks(reference).await?.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_shapes() {
        let id = "dQw4w9WgXcQ";
        for reference in [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "youtu.be/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(video_id(reference).unwrap(), id, "{}", reference);
        }
    }

    #[test]
    fn test_video_id_invalid() {
        for reference in [
            "",
            "not a video",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/feed/trending",
            "https://vimeo.com/12345678901",
        ] {
            assert!(matches!(
                video_id(reference),
                Err(ExtractionError::InvalidReference(_))
            ));
        }
    }

    #[test]
    fn test_caption_tracks_json_handles_nested_brackets() {
        let page = r#"var x = {"captions":{"captionTracks":[{"baseUrl":"https://a/b?x=[1]","name":{"runs":[{"text":"a\"]"}]},"languageCode":"en"}],"audioTracks":[]}};"#;
        let json = caption_tracks_json(page).unwrap();
        let tracks: Vec<CaptionTrack> = serde_json::from_str(json).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].base_url, "https://a/b?x=[1]");
        assert_eq!(tracks[0].language_code, "en");
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0" dur="1.5">Hello &amp;amp; welcome</text>
            <text start="1.5" dur="1">it&amp;#39;s
            fine</text>
            <text start="2.5" dur="1">   </text>
        </transcript>"#;
        assert_eq!(parse_timedtext(xml), vec!["Hello & welcome", "it's fine"]);
    }

    #[test]
    fn test_sample_chunks() {
        let segments: Vec<String> = (0..10).map(|i| format!("s{}", i)).collect();
        assert_eq!(
            sample_chunks(&segments, 2, 2),
            vec!["s0\ns2", "s4\ns6", "s8"]
        );
        assert_eq!(sample_chunks(&segments, 4, 150), vec!["s0\ns4\ns8"]);
        assert!(sample_chunks(&[], 4, 150).is_empty());
    }
}
