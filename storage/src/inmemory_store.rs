//! In-memory credential store for tests and development. Data is lost on restart.

use crate::repository::CredentialStore;
use async_trait::async_trait;
use bridge_core::StorageError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, api_key: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(user_id.to_string(), api_key.to_string());
        Ok(())
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        Ok(self.entries.read().await.clone())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
