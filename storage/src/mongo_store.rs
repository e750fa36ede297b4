//! MongoDB backend: collection `api_key`, one `{ user_id, api_key }` document per user.

use crate::models::CredentialRecord;
use crate::repository::CredentialStore;
use async_trait::async_trait;
use bridge_core::StorageError;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use std::collections::HashMap;
use tracing::info;

pub const COLLECTION_NAME: &str = "api_key";

#[derive(Clone)]
pub struct MongoCredentialStore {
    collection: Collection<CredentialRecord>,
}

impl MongoCredentialStore {
    /// Connects to `uri` and binds the credential collection of `database`.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StorageError> {
        info!(database = %database, "Connecting to MongoDB");
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::Unreachable(e.to_string()))?;
        Ok(Self::with_client(&client, database))
    }

    pub fn with_client(client: &Client, database: &str) -> Self {
        Self {
            collection: client
                .database(database)
                .collection::<CredentialRecord>(COLLECTION_NAME),
        }
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let record = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;
        Ok(record.map(|r| r.api_key))
    }

    async fn set(&self, user_id: &str, api_key: &str) -> Result<(), StorageError> {
        self.collection
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "user_id": user_id, "api_key": api_key } },
            )
            .upsert(true)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        info!(user_id = %user_id, "Credential written to MongoDB");
        Ok(())
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| StorageError::Unreachable(e.to_string()))?;
        let mut data = HashMap::new();
        while let Some(record) = cursor
            .try_next()
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?
        {
            data.insert(record.user_id, record.api_key);
        }
        info!(count = data.len(), "Credentials loaded from MongoDB");
        Ok(data)
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }
}
