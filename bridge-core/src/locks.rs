//! Per-key async locks.
//!
//! [`KeyedLocks`] hands out one FIFO mutex per key (user id), so work for the same user is
//! serialized in arrival order while different users never wait on each other.
//!
//! Entries nobody holds or waits on are pruned on the next call to [`KeyedLocks::lock`], so the
//! map stays proportional to the number of users with work in flight.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the lock of `key`. The map guard is released before waiting.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Holders and waiters each keep a clone; a count of one means the entry is idle.
            locks.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked: those in use plus idle ones not yet pruned.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
