//! # Prompt
//!
//! Conversation entry types and instruction templates.
//!
//! ## Types
//!
//! - [`MessageRole`]: system / user / assistant, one-to-one with OpenAI Chat Completions `role`.
//! - [`ChatMessage`]: one role-tagged text turn. Entries are immutable once built.
//!
//! ## Templates
//!
//! [`website_summary_request`] and [`video_summary_request`] fold text extracted from a link into
//! a single user turn, so the dispatcher can send it like any other message.

use serde::{Deserialize, Serialize};

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

impl MessageRole {
    /// Role name in the OpenAI vocabulary.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}

/// Instruction placed before text extracted from a web page.
pub const WEBSITE_SUMMARY_INSTRUCTION: &str = "Summarize the following web page in the language \
of the question. Keep the key points, names and numbers, and ignore navigation or advertising \
text.";

/// Instruction placed before a video transcript.
pub const VIDEO_SUMMARY_INSTRUCTION: &str = "The following is a partial transcript of a video, \
sampled at regular intervals. Summarize what the video is about and list its main points.";

fn summary_request(instruction: &str, source: &str, note: &str, body: &str) -> String {
    let mut out = String::with_capacity(instruction.len() + body.len() + 64);
    out.push_str(instruction);
    out.push_str("\n\nSource: ");
    out.push_str(source);
    out.push('\n');
    let note = note.trim();
    if !note.is_empty() {
        out.push_str("Question: ");
        out.push_str(note);
        out.push('\n');
    }
    out.push_str("\n---\n");
    out.push_str(body.trim());
    out
}

/// Builds the user turn asking for a summary of a web page.
///
/// `note` is whatever the user wrote around the link; empty notes are omitted.
pub fn website_summary_request(url: &str, note: &str, page_text: &str) -> String {
    summary_request(WEBSITE_SUMMARY_INSTRUCTION, url, note, page_text)
}

/// Builds the user turn asking for a summary of a video transcript.
pub fn video_summary_request(url: &str, note: &str, transcript: &str) -> String {
    summary_request(VIDEO_SUMMARY_INSTRUCTION, url, note, transcript)
}
