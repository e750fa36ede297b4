//! # Readers
//!
//! Content readers turn an external reference into plain text that can be folded into a
//! conversation turn:
//!
//! - [`YoutubeReader`]: video reference → sampled transcript
//! - [`WebsiteReader`]: page URL → readable text without markup or navigation
//!
//! Readers are pure with respect to conversation memory; they only return text or an
//! [`ExtractionError`]. Both use a shared HTTP client with a bounded timeout (see
//! [`http_client`]).

mod html;
mod website;
mod youtube;

use async_trait::async_trait;
use std::time::Duration;

pub use bridge_core::ExtractionError;
pub use website::WebsiteReader;
pub use youtube::{video_id, YoutubeReader};

/// Desktop browser user agent; some sites refuse requests without one.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Converts a reference into plain text.
#[async_trait]
pub trait ContentReader: Send + Sync {
    async fn extract(&self, reference: &str) -> Result<String, ExtractionError>;
}

/// HTTP client used by the readers: bounded total timeout, browser user agent.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(USER_AGENT)
        .build()
}

/// Returns the first http(s) URL found in `text`, without trailing punctuation.
pub fn find_url(text: &str) -> Option<&str> {
    let start = [text.find("https://"), text.find("http://")]
        .into_iter()
        .flatten()
        .min()?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '「' | '」'))
        .unwrap_or(rest.len());
    let url = rest[..end].trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '。' | '，' | '！' | '？')
    });
    if url.len() <= "https://".len() {
        return None;
    }
    Some(url)
}

/// Whether `url` points at a YouTube video.
pub fn is_video_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let is_youtube_host = lower.contains("youtube.com/")
        || lower.contains("youtu.be/")
        || lower.contains("youtube-nocookie.com/");
    is_youtube_host && video_id(url).is_ok()
}

/// Maps a transport error into the reader taxonomy.
pub(crate) fn request_error(url: &str, e: reqwest::Error) -> ExtractionError {
    if e.is_timeout() {
        ExtractionError::Unreachable(format!("{} timed out", url))
    } else if e.is_builder() {
        ExtractionError::InvalidReference(url.to_string())
    } else {
        ExtractionError::Unreachable(format!("{}: {}", url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_url_in_sentence() {
        assert_eq!(
            find_url("please read https://example.com/a?b=1, thanks"),
            Some("https://example.com/a?b=1")
        );
        assert_eq!(
            find_url("看這個 https://youtu.be/dQw4w9WgXcQ。"),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
        assert_eq!(find_url("http://example.org"), Some("http://example.org"));
    }

    #[test]
    fn test_find_url_none() {
        assert_eq!(find_url("no links here"), None);
        assert_eq!(find_url("broken https:// link"), None);
    }

    #[test]
    fn test_is_video_url() {
        assert!(is_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_video_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_video_url("https://youtube.com/shorts/dQw4w9WgXcQ"));
        assert!(!is_video_url("https://example.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_video_url("https://www.youtube.com/feed/trending"));
    }
}
