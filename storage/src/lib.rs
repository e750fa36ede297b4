//! Storage crate: per-user API credential persistence.
//!
//! ## Modules
//!
//! - [`repository`] – [`CredentialStore`] trait shared by every backend
//! - [`file_store`] – single JSON document on disk
//! - [`sqlite_store`] – SQLite table (via [`SqlitePoolManager`])
//! - [`mongo_store`] – MongoDB collection
//! - [`inmemory_store`] – process-local map, for tests and development
//!
//! Call sites hold an `Arc<dyn CredentialStore>` built once by [`open_store`].

mod file_store;
mod inmemory_store;
mod models;
mod mongo_store;
mod repository;
mod sqlite_pool;
mod sqlite_store;

use bridge_core::StorageBackend;
use std::sync::Arc;
use tracing::info;

pub use bridge_core::StorageError;
pub use file_store::FileCredentialStore;
pub use inmemory_store::InMemoryCredentialStore;
pub use models::CredentialRecord;
pub use mongo_store::MongoCredentialStore;
pub use repository::CredentialStore;
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_store::SqliteCredentialStore;

/// Builds the configured backend. Connecting is the only I/O done here; nothing is loaded.
pub async fn open_store(backend: &StorageBackend) -> Result<Arc<dyn CredentialStore>, StorageError> {
    let store: Arc<dyn CredentialStore> = match backend {
        StorageBackend::File { path } => Arc::new(FileCredentialStore::new(path)),
        StorageBackend::Sqlite { path } => Arc::new(SqliteCredentialStore::new(path).await?),
        StorageBackend::Mongo { uri, database } => {
            Arc::new(MongoCredentialStore::connect(uri, database).await?)
        }
    };
    info!(backend = store.backend_name(), "Credential store opened");
    Ok(store)
}
