//! Bounded conversation window for one user.
//!
//! Layout is always `[system, e1, e2, ...]`. The non-system part holds at most `max_exchanges`
//! exchanges, where an exchange starts at a user entry and carries the assistant reply that
//! follows it. Eviction removes whole exchanges from the front, so a user entry is never left
//! without its reply while the reply is dropped (or the reverse).

use prompt::{ChatMessage, MessageRole};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ConversationWindow {
    system: ChatMessage,
    entries: VecDeque<ChatMessage>,
    max_exchanges: usize,
}

impl ConversationWindow {
    pub fn new(system_message: impl Into<String>, max_exchanges: usize) -> Self {
        Self {
            system: ChatMessage::system(system_message),
            entries: VecDeque::new(),
            max_exchanges,
        }
    }

    /// Appends one entry and evicts the oldest exchanges past the bound.
    ///
    /// A system entry is not appended; it replaces the preamble instead.
    pub fn push(&mut self, message: ChatMessage) {
        if message.is_system() {
            self.system = message;
            return;
        }
        self.entries.push_back(message);
        self.trim();
    }

    fn exchange_count(&self) -> usize {
        let starts = self
            .entries
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count();
        match self.entries.front() {
            Some(first) if first.role != MessageRole::User => starts + 1,
            _ => starts,
        }
    }

    fn evict_oldest_exchange(&mut self) {
        if self.entries.pop_front().is_none() {
            return;
        }
        while matches!(self.entries.front(), Some(m) if m.role != MessageRole::User) {
            self.entries.pop_front();
        }
    }

    fn trim(&mut self) {
        while self.exchange_count() > self.max_exchanges {
            self.evict_oldest_exchange();
        }
        // Consecutive assistant entries could still overflow 2·N.
        while self.entries.len() > self.max_exchanges * 2 {
            self.entries.pop_front();
        }
    }

    /// System entry followed by the window, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(self.entries.len() + 1);
        out.push(self.system.clone());
        out.extend(self.entries.iter().cloned());
        out
    }

    /// Total entries including the system entry.
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent non-system entry.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.back()
    }

    pub fn system_message(&self) -> &str {
        &self.system.content
    }

    pub fn set_system_message(&mut self, text: impl Into<String>) {
        self.system = ChatMessage::system(text);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
