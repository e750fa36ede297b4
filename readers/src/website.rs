//! Web page reader: fetches a page and keeps its readable text.

use crate::html::{collapse_whitespace, extract_text_from_html};
use crate::{request_error, ContentReader};
use async_trait::async_trait;
use bridge_core::ExtractionError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{info, instrument};

pub const DEFAULT_MAX_CHARS: usize = 12_000;
const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";

#[derive(Clone)]
pub struct WebsiteReader {
    client: reqwest::Client,
    max_chars: usize,
}

impl WebsiteReader {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }
}

fn validate_url(reference: &str) -> Result<Url, ExtractionError> {
    let url = Url::parse(reference.trim())
        .map_err(|_| ExtractionError::InvalidReference(reference.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ExtractionError::InvalidReference(reference.to_string())),
    }
}

/// Cuts `text` to at most `max_chars` characters, marking the cut.
fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

#[async_trait]
impl ContentReader for WebsiteReader {
    #[instrument(skip(self))]
    async fn extract(&self, reference: &str) -> Result<String, ExtractionError> {
        let url = validate_url(reference)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| request_error(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(ExtractionError::Unreachable(format!(
                "HTTP {} when fetching {}",
                response.status(),
                url
            )));
        }

        // Servers that omit the header are assumed to serve HTML.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();
        let is_html = content_type.contains("text/html") || content_type.contains("xhtml");
        let is_plain = content_type.starts_with("text/plain");
        if !is_html && !is_plain {
            return Err(ExtractionError::UnsupportedContent(content_type));
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_error(url.as_str(), e))?;
        let text = if is_html {
            extract_text_from_html(&body)
        } else {
            collapse_whitespace(&body)
        };
        if text.is_empty() {
            return Err(ExtractionError::Empty(url.to_string()));
        }

        let text = truncate_chars(text, self.max_chars);
        info!(url = %url, chars = text.chars().count(), "Page text extracted");
        Ok(text)
    }
}
