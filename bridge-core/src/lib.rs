//! # bridge-core
//!
//! Core types shared by every crate of the chat bridge: the inbound [`ChatEvent`] and outbound
//! [`Outbound`] shapes, the error taxonomy ([`StorageError`], [`ExtractionError`], [`ModelError`],
//! aggregated by [`BridgeError`]), environment configuration, per-key locking and tracing
//! initialization. Transport-agnostic; the webhook layer only needs these types.

pub mod config;
pub mod error;
pub mod locks;
pub mod logger;
pub mod types;

pub use config::{BridgeConfig, StorageBackend};
pub use error::{BridgeError, ExtractionError, ModelError, Result, StorageError, UpstreamKind};
pub use locks::KeyedLocks;
pub use logger::init_tracing;
pub use types::{ChatEvent, EventKind, Outbound};
