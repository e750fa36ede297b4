//! Process-wide conversation memory keyed by user id.
//!
//! Each user owns one [`ConversationWindow`] behind its own mutex; the outer map lock is only
//! held for lookup and insertion, so users never wait on each other's appends.

use crate::window::ConversationWindow;
use prompt::{ChatMessage, MessageRole};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

pub struct ConversationMemory {
    memory_message_count: usize,
    default_system_message: RwLock<String>,
    user_system_messages: RwLock<HashMap<String, String>>,
    windows: RwLock<HashMap<String, Arc<Mutex<ConversationWindow>>>>,
}

impl ConversationMemory {
    /// `memory_message_count` is the number of user/assistant exchanges kept per user.
    pub fn new(system_message: impl Into<String>, memory_message_count: usize) -> Self {
        Self {
            memory_message_count: memory_message_count.max(1),
            default_system_message: RwLock::new(system_message.into()),
            user_system_messages: RwLock::new(HashMap::new()),
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn memory_message_count(&self) -> usize {
        self.memory_message_count
    }

    async fn system_message_for(&self, user_id: &str) -> String {
        if let Some(text) = self.user_system_messages.read().await.get(user_id) {
            return text.clone();
        }
        self.default_system_message.read().await.clone()
    }

    /// Returns the user's window, creating it with only the system entry when missing.
    ///
    /// A user without history and a user never seen before look the same to callers; use
    /// [`ConversationMemory::contains`] to tell them apart.
    async fn window(&self, user_id: &str) -> Arc<Mutex<ConversationWindow>> {
        if let Some(w) = self.windows.read().await.get(user_id) {
            return w.clone();
        }
        let system = self.system_message_for(user_id).await;
        let mut windows = self.windows.write().await;
        windows
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id = %user_id, "Creating conversation memory");
                Arc::new(Mutex::new(ConversationWindow::new(
                    system,
                    self.memory_message_count,
                )))
            })
            .clone()
    }

    /// Appends one entry and trims the window to the configured number of exchanges.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn append(&self, user_id: &str, role: MessageRole, content: &str) {
        let window = self.window(user_id).await;
        let mut window = window.lock().await;
        window.push(ChatMessage::new(role, content));
        debug!(user_id = %user_id, entries = window.len(), "step: memory append done");
    }

    /// Ordered entries for the user: system entry first, then the window oldest first.
    /// Unknown users get a fresh memory holding only the system entry.
    pub async fn get_messages(&self, user_id: &str) -> Vec<ChatMessage> {
        let window = self.window(user_id).await;
        let window = window.lock().await;
        window.messages()
    }

    /// Most recent non-system entry, if any.
    pub async fn last_entry(&self, user_id: &str) -> Option<ChatMessage> {
        let window = self.window(user_id).await;
        let window = window.lock().await;
        window.last().cloned()
    }

    /// Whether a memory exists for the user (without creating one).
    pub async fn contains(&self, user_id: &str) -> bool {
        self.windows.read().await.contains_key(user_id)
    }

    /// Drops the user's history, keeping only the system entry.
    pub async fn reset(&self, user_id: &str) {
        let system = self.system_message_for(user_id).await;
        let window = self.window(user_id).await;
        let mut window = window.lock().await;
        window.clear();
        window.set_system_message(system);
        info!(user_id = %user_id, "Conversation memory reset");
    }

    /// Changes the default system message for memories created from now on.
    ///
    /// With `rewrite_existing`, the preamble of every existing memory without a per-user
    /// override is replaced as well; history is kept.
    pub async fn change_system_message(&self, text: &str, rewrite_existing: bool) {
        {
            let mut default = self.default_system_message.write().await;
            *default = text.to_string();
        }
        info!(rewrite_existing, "Default system message changed");
        if !rewrite_existing {
            return;
        }

        let overridden: Vec<String> = self
            .user_system_messages
            .read()
            .await
            .keys()
            .cloned()
            .collect();
        let windows: Vec<(String, Arc<Mutex<ConversationWindow>>)> = self
            .windows
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (user_id, window) in windows {
            if overridden.contains(&user_id) {
                continue;
            }
            window.lock().await.set_system_message(text);
        }
    }

    /// Sets a system message for one user and resets that user's memory under it.
    pub async fn set_user_system_message(&self, user_id: &str, text: &str) {
        self.user_system_messages
            .write()
            .await
            .insert(user_id.to_string(), text.to_string());
        self.reset(user_id).await;
    }

    /// Number of users with a memory.
    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
