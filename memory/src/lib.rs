//! # Memory
//!
//! Bounded per-user conversation memory.
//!
//! ## Layout
//!
//! Every user's memory is `[system, ...window]`. The window keeps the most recent
//! `memory_message_count` user/assistant exchanges, so a memory never holds more than
//! `1 + 2 * memory_message_count` entries. The system entry is never evicted.
//!
//! ## Example
//!
//! ```rust
//! use memory::ConversationMemory;
//! use prompt::MessageRole;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let memory = ConversationMemory::new("S", 2);
//! memory.append("u1", MessageRole::User, "hello").await;
//! memory.append("u1", MessageRole::Assistant, "hi!").await;
//! assert_eq!(memory.get_messages("u1").await.len(), 3);
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! The user map sits behind a `RwLock` and each window behind its own `Mutex`.

mod conversation;
mod window;

pub use conversation::ConversationMemory;
pub use window::ConversationWindow;
