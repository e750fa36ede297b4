//! Error taxonomy.
//!
//! Each layer owns one enum; [`BridgeError`] aggregates them for the session router, which turns
//! every kind into one stable user-facing text via [`BridgeError::user_message`].

use thiserror::Error;

/// Credential persistence failures (file, sqlite or document database backend).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend unreachable: {0}")]
    Unreachable(String),

    #[error("Storage write failed: {0}")]
    Write(String),

    #[error("Storage read failed: {0}")]
    Read(String),

    #[error("Corrupt storage document: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Write(e.to_string())
    }
}

/// Content reader failures. Readers never panic; every problem lands here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("No transcript available for {0}")]
    NoTranscript(String),

    #[error("Source unreachable: {0}")]
    Unreachable(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No readable text in {0}")]
    Empty(String),
}

/// Why the hosted model API refused or failed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// The API rejected the user's key.
    InvalidCredential,
    /// Quota or rate limit reached.
    RateLimited,
    /// Network error, timeout or any other non-2xx answer.
    Unavailable,
}

/// Model dispatch failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("No credential registered for user {0}")]
    NoCredential(String),

    #[error("Upstream error ({kind:?}): {message}")]
    Upstream { kind: UpstreamKind, message: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The request could not be built locally; nothing was sent.
    #[error("Invalid model request: {0}")]
    InvalidRequest(String),
}

impl ModelError {
    pub fn upstream(kind: UpstreamKind, message: impl Into<String>) -> Self {
        ModelError::Upstream {
            kind,
            message: message.into(),
        }
    }
}

/// Aggregated error seen by the session router.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

pub const MSG_NO_CREDENTIAL: &str =
    "Please register your OpenAI API key first: /register sk-xxxxx";
pub const MSG_INVALID_CREDENTIAL: &str =
    "Your API key was rejected. Please register a valid key with /register sk-xxxxx";
pub const MSG_RATE_LIMITED: &str =
    "The model is receiving too many requests on this key. Please try again later.";
pub const MSG_UPSTREAM: &str = "The model service is unavailable right now. Please try again later.";
pub const MSG_MALFORMED: &str = "Sorry, the model returned an unexpected answer. Please try again.";
pub const MSG_INVALID_REQUEST: &str = "Sorry, that message could not be sent to the model.";
pub const MSG_EXTRACTION: &str =
    "Sorry, I could not read that link. Check that it is reachable and has readable text or captions.";
pub const MSG_STORAGE: &str =
    "Sorry, your settings could not be read or saved right now. Please try again later.";
pub const MSG_CONFIG: &str = "Sorry, the assistant is misconfigured.";

impl BridgeError {
    /// Stable user-readable text for this failure kind. Never includes upstream details.
    pub fn user_message(&self) -> &'static str {
        match self {
            BridgeError::Model(ModelError::NoCredential(_)) => MSG_NO_CREDENTIAL,
            BridgeError::Model(ModelError::Upstream { kind, .. }) => match kind {
                UpstreamKind::InvalidCredential => MSG_INVALID_CREDENTIAL,
                UpstreamKind::RateLimited => MSG_RATE_LIMITED,
                UpstreamKind::Unavailable => MSG_UPSTREAM,
            },
            BridgeError::Model(ModelError::MalformedResponse(_)) => MSG_MALFORMED,
            BridgeError::Model(ModelError::InvalidRequest(_)) => MSG_INVALID_REQUEST,
            BridgeError::Extraction(_) => MSG_EXTRACTION,
            BridgeError::Storage(_) => MSG_STORAGE,
            BridgeError::Config(_) => MSG_CONFIG,
        }
    }

    /// True when the user can fix the problem themselves (register or replace a key).
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            BridgeError::Model(ModelError::NoCredential(_))
                | BridgeError::Model(ModelError::Upstream {
                    kind: UpstreamKind::InvalidCredential,
                    ..
                })
        )
    }
}
