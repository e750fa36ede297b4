//! SQLite backend: one row per user in `api_keys`.
//!
//! Writes are single upsert statements, so a reader sees either the old or the new key.

use crate::models::CredentialRecord;
use crate::repository::CredentialStore;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use bridge_core::StorageError;
use std::collections::HashMap;
use tracing::info;

#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool_manager: SqlitePoolManager,
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Unreachable(e.to_string())
}

impl SqliteCredentialStore {
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(path).await.map_err(db_err)?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating api_keys table if not exist");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                user_id TEXT PRIMARY KEY,
                api_key TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "SELECT user_id, api_key FROM api_keys WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await
        .map_err(|e| StorageError::Read(e.to_string()))?;
        Ok(record.map(|r| r.api_key))
    }

    async fn set(&self, user_id: &str, api_key: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (user_id, api_key) VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET api_key = excluded.api_key
            "#,
        )
        .bind(user_id)
        .bind(api_key)
        .execute(self.pool_manager.pool())
        .await
        .map_err(|e| StorageError::Write(e.to_string()))?;
        info!(user_id = %user_id, "Credential written to sqlite");
        Ok(())
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let records =
            sqlx::query_as::<_, CredentialRecord>("SELECT user_id, api_key FROM api_keys")
                .fetch_all(self.pool_manager.pool())
                .await
                .map_err(|e| StorageError::Read(e.to_string()))?;
        info!(count = records.len(), "Credentials loaded from sqlite");
        Ok(records.into_iter().map(|r| (r.user_id, r.api_key)).collect())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
