//! Integration tests for [`memory::ConversationMemory`].
//!
//! Covers the bounded window, lazy creation, reset, idempotent reads and system message changes.

use memory::ConversationMemory;
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;

fn contents(messages: &[ChatMessage]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

async fn push_pairs(memory: &ConversationMemory, user_id: &str, pairs: usize) {
    for i in 0..pairs {
        memory
            .append(user_id, MessageRole::User, &format!("q{}", i))
            .await;
        memory
            .append(user_id, MessageRole::Assistant, &format!("r{}", i))
            .await;
    }
}

/// **Test: More pairs than the bound keeps exactly 1 + 2·bound entries, newest pairs in order.**
#[tokio::test]
async fn test_window_keeps_most_recent_pairs() {
    for bound in 1..=4usize {
        let memory = ConversationMemory::new("S", bound);
        push_pairs(&memory, "u1", bound + 3).await;

        let messages = memory.get_messages("u1").await;
        assert_eq!(messages.len(), 1 + 2 * bound);
        assert_eq!(messages[0], ChatMessage::system("S"));

        let total = bound + 3;
        for (k, pair) in messages[1..].chunks(2).enumerate() {
            let i = total - bound + k;
            assert_eq!(pair[0], ChatMessage::user(format!("q{}", i)));
            assert_eq!(pair[1], ChatMessage::assistant(format!("r{}", i)));
        }
    }
}

/// **Test: Scenario with bound 2: a1 b1 a2 b2 a3 leaves [S, a2, b2, a3].**
#[tokio::test]
async fn test_third_user_turn_evicts_first_pair() {
    let memory = ConversationMemory::new("S", 2);
    memory.append("u1", MessageRole::User, "a1").await;
    memory.append("u1", MessageRole::Assistant, "b1").await;
    memory.append("u1", MessageRole::User, "a2").await;
    memory.append("u1", MessageRole::Assistant, "b2").await;
    memory.append("u1", MessageRole::User, "a3").await;

    let messages = memory.get_messages("u1").await;
    assert_eq!(contents(&messages), vec!["S", "a2", "b2", "a3"]);
    assert_eq!(messages[3].role, MessageRole::User);
}

/// **Test: Unknown users are lazily given a memory holding only the system entry.**
#[tokio::test]
async fn test_unknown_user_is_lazily_initialized() {
    let memory = ConversationMemory::new("S", 2);
    assert!(!memory.contains("new-user").await);

    let messages = memory.get_messages("new-user").await;

    assert_eq!(messages, vec![ChatMessage::system("S")]);
    assert!(memory.contains("new-user").await);
    assert_eq!(memory.len().await, 1);
}

/// **Test: reset leaves exactly the system entry regardless of history length.**
#[tokio::test]
async fn test_reset_restores_system_only() {
    let memory = ConversationMemory::new("S", 3);
    push_pairs(&memory, "u1", 7).await;
    memory.append("u1", MessageRole::User, "dangling").await;

    memory.reset("u1").await;

    assert_eq!(memory.get_messages("u1").await, vec![ChatMessage::system("S")]);
    assert!(memory.last_entry("u1").await.is_none());
}

/// **Test: Two reads without an append return identical sequences.**
#[tokio::test]
async fn test_get_messages_is_idempotent() {
    let memory = ConversationMemory::new("S", 2);
    push_pairs(&memory, "u1", 3).await;
    memory.append("u1", MessageRole::User, "pending").await;

    let first = memory.get_messages("u1").await;
    let second = memory.get_messages("u1").await;
    assert_eq!(first, second);
}

/// **Test: Users do not share memory.**
#[tokio::test]
async fn test_users_are_isolated() {
    let memory = ConversationMemory::new("S", 2);
    memory.append("u1", MessageRole::User, "from u1").await;
    memory.append("u2", MessageRole::User, "from u2").await;

    assert_eq!(contents(&memory.get_messages("u1").await), vec!["S", "from u1"]);
    assert_eq!(contents(&memory.get_messages("u2").await), vec!["S", "from u2"]);
}

/// **Test: Changing the default system message only affects new memories unless rewrite is asked.**
#[tokio::test]
async fn test_change_system_message_scope() {
    let memory = ConversationMemory::new("S", 2);
    memory.append("old", MessageRole::User, "hi").await;

    memory.change_system_message("T", false).await;
    assert_eq!(memory.get_messages("old").await[0].content, "S");
    assert_eq!(memory.get_messages("new").await[0].content, "T");

    memory.change_system_message("U", true).await;
    let old = memory.get_messages("old").await;
    assert_eq!(contents(&old), vec!["U", "hi"]);
    assert_eq!(memory.get_messages("new").await[0].content, "U");
}

/// **Test: A per-user system message resets that user only and survives later resets.**
#[tokio::test]
async fn test_user_system_message_override() {
    let memory = ConversationMemory::new("S", 2);
    memory.append("u1", MessageRole::User, "hi").await;
    memory.append("u2", MessageRole::User, "hey").await;

    memory.set_user_system_message("u1", "Be brief.").await;
    assert_eq!(memory.get_messages("u1").await, vec![ChatMessage::system("Be brief.")]);
    assert_eq!(contents(&memory.get_messages("u2").await), vec!["S", "hey"]);

    memory.change_system_message("T", true).await;
    memory.reset("u1").await;
    assert_eq!(memory.get_messages("u1").await[0].content, "Be brief.");
    assert_eq!(memory.get_messages("u2").await[0].content, "T");
}

/// **Test: Concurrent appends for many users keep every window within its bound.**
#[tokio::test]
async fn test_concurrent_users_stay_bounded() {
    let memory = Arc::new(ConversationMemory::new("S", 2));
    let mut tasks = Vec::new();
    for u in 0..8 {
        let memory = memory.clone();
        tasks.push(tokio::spawn(async move {
            let user_id = format!("user{}", u);
            push_pairs(&memory, &user_id, 10).await;
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    assert_eq!(memory.len().await, 8);
    for u in 0..8 {
        let messages = memory.get_messages(&format!("user{}", u)).await;
        assert_eq!(contents(&messages), vec!["S", "q8", "r8", "q9", "r9"]);
    }
}
