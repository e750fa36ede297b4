//! Credential record model.
//!
//! Maps to the `api_keys` table (SQLite) and to documents of the `api_key` collection (MongoDB).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CredentialRecord {
    pub user_id: String,
    pub api_key: String,
}

impl CredentialRecord {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
        }
    }
}
