//! JSON file backend.
//!
//! The whole mapping lives in one document `{ "<user_id>": "<api_key>" }`. Every `set` rewrites
//! the document through a temp file and a rename, so readers of the file never see a torn write,
//! and updates the in-memory copy only after the rename succeeded.
//!
//! The in-memory copy only answers hits. A miss, and every `set`, re-reads the document so keys
//! written by another process sharing the file are picked up and not overwritten.

use crate::repository::CredentialStore;
use async_trait::async_trait;
use bridge_core::StorageError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

pub struct FileCredentialStore {
    path: PathBuf,
    /// `None` until the document has been read once.
    cache: RwLock<Option<HashMap<String, String>>>,
    /// Serializes document rewrites.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store for `path`. Nothing is read until [`CredentialStore::load_all`] or the
    /// first [`CredentialStore::get`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<HashMap<String, String>, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Credential file missing, starting empty");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(StorageError::Read(e.to_string())),
        };
        if raw.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    async fn write_document(&self, data: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json =
            serde_json::to_vec_pretty(data).map_err(|e| StorageError::Write(e.to_string()))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Current mapping, reading the document on first use.
    async fn snapshot(&self) -> Result<HashMap<String, String>, StorageError> {
        if let Some(data) = self.cache.read().await.as_ref() {
            return Ok(data.clone());
        }
        let data = self.read_document().await?;
        let mut cache = self.cache.write().await;
        Ok(cache.get_or_insert(data).clone())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        if let Some(key) = self
            .cache
            .read()
            .await
            .as_ref()
            .and_then(|data| data.get(user_id))
        {
            return Ok(Some(key.clone()));
        }

        let _guard = self.write_lock.lock().await;
        let data = self.read_document().await?;
        let key = data.get(user_id).cloned();
        *self.cache.write().await = Some(data);
        Ok(key)
    }

    #[instrument(skip(self, api_key))]
    async fn set(&self, user_id: &str, api_key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.read_document().await?;
        next.insert(user_id.to_string(), api_key.to_string());
        self.write_document(&next).await?;

        *self.cache.write().await = Some(next);
        info!(user_id = %user_id, path = %self.path.display(), "Credential written to file");
        Ok(())
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let data = self.read_document().await?;
        *self.cache.write().await = Some(data.clone());
        info!(path = %self.path.display(), count = data.len(), "Credentials loaded from file");
        Ok(data)
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        self.write_document(&snapshot).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
