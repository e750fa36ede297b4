//! Persistence models.

mod credential_record;

pub use credential_record::CredentialRecord;
