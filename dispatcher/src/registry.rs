//! Model handle registry.

use bridge_core::{BridgeError, KeyedLocks, ModelError, StorageError, UpstreamKind};
use llm_client::{LlmClient, LlmClientFactory};
use std::collections::HashMap;
use std::sync::Arc;
use storage::CredentialStore;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Process-wide map user id → model handle.
///
/// Handles are built by the factory from the stored key. The map is hydrated once at startup and
/// filled lazily from the store for users registered by another process.
pub struct ModelRegistry {
    factory: Arc<dyn LlmClientFactory>,
    store: Arc<dyn CredentialStore>,
    handles: RwLock<HashMap<String, Arc<dyn LlmClient>>>,
    locks: KeyedLocks,
}

impl ModelRegistry {
    pub fn new(factory: Arc<dyn LlmClientFactory>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            factory,
            store,
            handles: RwLock::new(HashMap::new()),
            locks: KeyedLocks::new(),
        }
    }

    /// Builds a handle for every stored credential. An unreadable store counts as empty.
    /// Returns the number of handles now registered.
    #[instrument(skip(self), fields(backend = self.store.backend_name()))]
    pub async fn hydrate(&self) -> usize {
        let credentials = match self.store.load_all().await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "Failed to load credentials, starting without registered users");
                return self.handles.read().await.len();
            }
        };
        let mut handles = self.handles.write().await;
        for (user_id, api_key) in credentials {
            handles.insert(user_id, self.factory.create(&api_key));
        }
        info!(users = handles.len(), "Model handles hydrated");
        handles.len()
    }

    /// Handle for `user_id`, looking the credential up in the store on a miss.
    ///
    /// A store failure is returned as is; only a confirmed absence is `NoCredential`.
    pub async fn resolve(&self, user_id: &str) -> Result<Arc<dyn LlmClient>, BridgeError> {
        if let Some(handle) = self.handles.read().await.get(user_id) {
            return Ok(handle.clone());
        }

        let api_key = match self.store.get(user_id).await {
            Ok(Some(key)) => key,
            Ok(None) => return Err(ModelError::NoCredential(user_id.to_string()).into()),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Credential lookup failed");
                return Err(e.into());
            }
        };
        debug!(user_id = %user_id, "step: handle built from stored credential");
        let mut handles = self.handles.write().await;
        let handle = handles
            .entry(user_id.to_string())
            .or_insert_with(|| self.factory.create(&api_key))
            .clone();
        Ok(handle)
    }

    /// Validates `api_key`, stores it, then swaps the user's handle.
    ///
    /// Registrations for one user are serialized. Nothing changes when validation or the store
    /// write fails; readers see the old handle or the new one, never a mix.
    #[instrument(skip(self, api_key))]
    pub async fn register(&self, user_id: &str, api_key: &str) -> Result<(), BridgeError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ModelError::upstream(UpstreamKind::InvalidCredential, "empty key").into());
        }
        let _guard = self.locks.lock(user_id).await;

        let handle = self.factory.create(api_key);
        handle.validate_credential().await?;
        self.store.set(user_id, api_key).await?;
        self.handles
            .write()
            .await
            .insert(user_id.to_string(), handle);
        info!(user_id = %user_id, "Credential registered");
        Ok(())
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.handles.read().await.contains_key(user_id)
    }

    /// Number of handles currently held in memory.
    pub async fn len(&self) -> usize {
        self.handles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Flushes the credential store.
    pub async fn persist(&self) -> Result<(), StorageError> {
        self.store.persist().await
    }
}
