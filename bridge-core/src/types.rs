//! Inbound event and outbound reply types exchanged with the transport layer.

use serde::{Deserialize, Serialize};

/// Kind of user action delivered by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Text,
    Audio,
    Image,
}

/// One user action as seen by the core: who sent it, what kind it is, and its text payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub user_id: String,
    pub kind: EventKind,
    pub text: String,
}

impl ChatEvent {
    pub fn text(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Text,
            text: text.into(),
        }
    }
}

/// Reply handed back to the transport for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    Text(String),
    /// URL of a generated image.
    Image(String),
}

impl Outbound {
    /// Text body, or the image URL.
    pub fn as_str(&self) -> &str {
        match self {
            Outbound::Text(s) | Outbound::Image(s) => s,
        }
    }
}
