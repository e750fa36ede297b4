use async_trait::async_trait;
use bridge_core::StorageError;
use std::collections::HashMap;

/// Mapping from user id to API key, persisted by one backend.
///
/// `set` must be durable when it returns and must never let a concurrent `get` observe a partially
/// written key.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, user_id: &str, api_key: &str) -> Result<(), StorageError>;

    /// Every stored credential. A store that does not exist yet yields an empty map.
    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError>;

    /// Flushes buffered writes. Backends that write through need not override this.
    async fn persist(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}
