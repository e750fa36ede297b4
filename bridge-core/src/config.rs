//! Bridge configuration, loaded from environment variables.
//!
//! Call `dotenvy::dotenv()` before [`BridgeConfig::load`] so `.env` values are visible.

use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

/// Default system preamble when `SYSTEM_MESSAGE` is unset or blank.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// Which credential store backend is used. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Single JSON document on local disk.
    File { path: String },
    /// SQLite table via sqlx.
    Sqlite { path: String },
    /// Remote MongoDB collection.
    Mongo { uri: String, database: String },
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub system_message: String,
    pub memory_message_count: usize,
    pub storage: StorageBackend,
    pub openai_base_url: String,
    pub ai_model: String,
    pub image_size: String,
    pub youtube_step: usize,
    pub reader_timeout_secs: u64,
    pub website_max_chars: usize,
    pub log_file: String,
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        _ => Ok(default),
    }
}

fn load_storage_backend() -> Result<StorageBackend> {
    let use_mongo = env::var("USE_MONGO").map(|v| !v.is_empty()).unwrap_or(false);
    let backend = env::var("STORAGE_BACKEND")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| if use_mongo { "mongo" } else { "file" }.to_string());

    match backend.trim().to_lowercase().as_str() {
        "file" => Ok(StorageBackend::File {
            path: env::var("CREDENTIALS_FILE").unwrap_or_else(|_| "db.json".to_string()),
        }),
        "sqlite" => Ok(StorageBackend::Sqlite {
            path: env::var("SQLITE_PATH")
                .unwrap_or_else(|_| "./data/credentials.db".to_string()),
        }),
        "mongo" | "mongodb" => Ok(StorageBackend::Mongo {
            uri: env::var("MONGO_URI").context("MONGO_URI not set (required for mongo storage)")?,
            database: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "chatbridge".to_string()),
        }),
        other => bail!("Unknown STORAGE_BACKEND: {}", other),
    }
}

impl BridgeConfig {
    pub fn load() -> Result<Self> {
        let system_message = env::var("SYSTEM_MESSAGE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string());
        let memory_message_count = parse_var("MEMORY_MESSAGE_COUNT", 2usize)?;
        if memory_message_count == 0 {
            bail!("MEMORY_MESSAGE_COUNT must be at least 1");
        }
        let youtube_step = parse_var("YOUTUBE_STEP", 4usize)?;
        if youtube_step == 0 {
            bail!("YOUTUBE_STEP must be at least 1");
        }

        Ok(Self {
            system_message,
            memory_message_count,
            storage: load_storage_backend()?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            image_size: env::var("IMAGE_SIZE").unwrap_or_else(|_| "512x512".to_string()),
            youtube_step,
            reader_timeout_secs: parse_var("READER_TIMEOUT_SECS", 15u64)?,
            website_max_chars: parse_var("WEBSITE_MAX_CHARS", 12000usize)?,
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "logs/chat-bridge.log".to_string()),
        })
    }
}
