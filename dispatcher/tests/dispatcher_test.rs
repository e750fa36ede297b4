//! Dispatcher and registry tests with a scripted model; no network.

use async_trait::async_trait;
use bridge_core::error::MSG_STORAGE;
use bridge_core::{BridgeError, ModelError, StorageError, UpstreamKind};
use dispatcher::{Dispatcher, ModelRegistry};
use llm_client::{LlmClient, LlmClientFactory};
use memory::ConversationMemory;
use prompt::{ChatMessage, MessageRole};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use storage::{CredentialStore, InMemoryCredentialStore};
use tokio::sync::Mutex;

/// Model that answers from a script and records every request.
#[derive(Default)]
struct ScriptedLlm {
    api_key: String,
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ModelError> {
        self.requests.lock().await.push(messages.clone());
        match self.script.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(format!(
                "[{}] echo: {}",
                self.api_key,
                messages.last().map(|m| m.content.as_str()).unwrap_or("")
            )),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, ModelError> {
        Ok(format!("https://images.test/{}.png", prompt.replace(' ', "-")))
    }

    async fn validate_credential(&self) -> Result<(), ModelError> {
        if self.api_key.starts_with("sk-") {
            Ok(())
        } else {
            Err(ModelError::upstream(
                UpstreamKind::InvalidCredential,
                "Incorrect API key provided",
            ))
        }
    }
}

/// Factory that hands out one shared [`ScriptedLlm`] per key.
#[derive(Default)]
struct ScriptedFactory {
    clients: std::sync::Mutex<HashMap<String, Arc<ScriptedLlm>>>,
}

impl ScriptedFactory {
    fn client(&self, api_key: &str) -> Arc<ScriptedLlm> {
        let mut clients = self.clients.lock().unwrap();
        clients
            .entry(api_key.to_string())
            .or_insert_with(|| {
                Arc::new(ScriptedLlm {
                    api_key: api_key.to_string(),
                    ..Default::default()
                })
            })
            .clone()
    }
}

impl LlmClientFactory for ScriptedFactory {
    fn create(&self, api_key: &str) -> Arc<dyn LlmClient> {
        self.client(api_key)
    }
}

/// Store whose reads and writes always fail.
struct BrokenStore;

#[async_trait]
impl CredentialStore for BrokenStore {
    async fn get(&self, _user_id: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unreachable("down".into()))
    }

    async fn set(&self, _user_id: &str, _api_key: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("read-only".into()))
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StorageError> {
        Err(StorageError::Unreachable("down".into()))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

struct Fixture {
    dispatcher: Dispatcher,
    factory: Arc<ScriptedFactory>,
    store: Arc<InMemoryCredentialStore>,
}

async fn fixture(credentials: &[(&str, &str)]) -> Fixture {
    let factory = Arc::new(ScriptedFactory::default());
    let store = Arc::new(InMemoryCredentialStore::with_entries(
        credentials.iter().map(|(u, k)| (u.to_string(), k.to_string())),
    ));
    let registry = Arc::new(ModelRegistry::new(factory.clone(), store.clone()));
    registry.hydrate().await;
    let memory = Arc::new(ConversationMemory::new("S", 2));
    Fixture {
        dispatcher: Dispatcher::new(memory, registry),
        factory,
        store,
    }
}

fn roles(messages: &[ChatMessage]) -> Vec<MessageRole> {
    messages.iter().map(|m| m.role).collect()
}

#[tokio::test]
async fn test_reply_records_exchange_and_sends_full_window() {
    let f = fixture(&[("u1", "sk-one")]).await;

    let answer = f.dispatcher.reply("u1", "hello").await.unwrap();
    assert_eq!(answer, "[sk-one] echo: hello");

    let messages = f.dispatcher.memory().get_messages("u1").await;
    assert_eq!(
        messages,
        vec![
            ChatMessage::system("S"),
            ChatMessage::user("hello"),
            ChatMessage::assistant("[sk-one] echo: hello"),
        ]
    );

    f.dispatcher.reply("u1", "again").await.unwrap();
    let requests = f.factory.client("sk-one").requests.lock().await.clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        roles(&requests[1]),
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User
        ]
    );
}

#[tokio::test]
async fn test_no_credential_leaves_memory_untouched() {
    let f = fixture(&[]).await;

    let err = f.dispatcher.reply("ghost", "hello").await.unwrap_err();
    assert!(matches!(err, BridgeError::Model(ModelError::NoCredential(ref user)) if user == "ghost"));
    assert!(!f.dispatcher.memory().contains("ghost").await);
}

#[tokio::test]
async fn test_upstream_failure_keeps_user_entry_and_retry_is_not_duplicated() {
    let f = fixture(&[("u1", "sk-one")]).await;
    let client = f.factory.client("sk-one");
    client
        .script
        .lock()
        .await
        .push_back(Err(ModelError::upstream(UpstreamKind::RateLimited, "429")));

    let err = f.dispatcher.reply("u1", "hello").await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Model(ModelError::Upstream {
            kind: UpstreamKind::RateLimited,
            ..
        })
    ));
    assert_eq!(
        f.dispatcher.memory().get_messages("u1").await,
        vec![ChatMessage::system("S"), ChatMessage::user("hello")]
    );

    f.dispatcher.reply("u1", "hello").await.unwrap();
    let messages = f.dispatcher.memory().get_messages("u1").await;
    assert_eq!(
        roles(&messages),
        vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
    );
    let requests = client.requests.lock().await.clone();
    assert_eq!(requests[1].len(), 2);
}

#[tokio::test]
async fn test_malformed_response_adds_no_assistant_entry() {
    let f = fixture(&[("u1", "sk-one")]).await;
    f.factory
        .client("sk-one")
        .script
        .lock()
        .await
        .push_back(Err(ModelError::MalformedResponse("no choices".into())));

    let err = f.dispatcher.reply("u1", "hello").await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Model(ModelError::MalformedResponse(_))
    ));
    let messages = f.dispatcher.memory().get_messages("u1").await;
    assert!(messages.iter().all(|m| m.role != MessageRole::Assistant));
}

#[tokio::test]
async fn test_memory_bound_holds_across_many_replies() {
    let f = fixture(&[("u1", "sk-one")]).await;
    for i in 0..10 {
        f.dispatcher.reply("u1", &format!("q{}", i)).await.unwrap();
    }
    let messages = f.dispatcher.memory().get_messages("u1").await;
    assert_eq!(messages.len(), 1 + 2 * 2);
    assert_eq!(messages[0], ChatMessage::system("S"));
    assert_eq!(messages[3], ChatMessage::user("q9"));
}

#[tokio::test]
async fn test_register_validates_then_swaps_handle() {
    let f = fixture(&[("u1", "sk-old")]).await;
    let registry = f.dispatcher.registry();

    let err = registry.register("u1", "bogus").await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Model(ModelError::Upstream {
            kind: UpstreamKind::InvalidCredential,
            ..
        })
    ));
    assert_eq!(f.store.get("u1").await.unwrap().as_deref(), Some("sk-old"));

    registry.register("u1", "  sk-new ").await.unwrap();
    assert_eq!(f.store.get("u1").await.unwrap().as_deref(), Some("sk-new"));
    let answer = f.dispatcher.reply("u1", "hi").await.unwrap();
    assert_eq!(answer, "[sk-new] echo: hi");
}

#[tokio::test]
async fn test_resolve_falls_back_to_store() {
    let f = fixture(&[]).await;
    f.store.set("late", "sk-late").await.unwrap();

    assert!(!f.dispatcher.registry().contains("late").await);
    let answer = f.dispatcher.reply("late", "hi").await.unwrap();
    assert_eq!(answer, "[sk-late] echo: hi");
    assert!(f.dispatcher.registry().contains("late").await);
}

#[tokio::test]
async fn test_broken_store_hydrates_empty_and_rejects_registration() {
    let registry = ModelRegistry::new(Arc::new(ScriptedFactory::default()), Arc::new(BrokenStore));
    assert_eq!(registry.hydrate().await, 0);
    assert!(registry.is_empty().await);

    let err = registry.register("u1", "sk-valid").await.unwrap_err();
    assert!(matches!(err, BridgeError::Storage(StorageError::Write(_))));
    assert!(!registry.contains("u1").await);
    assert!(matches!(
        registry.resolve("u1").await,
        Err(BridgeError::Storage(StorageError::Unreachable(_)))
    ));
}

#[tokio::test]
async fn test_store_outage_is_not_reported_as_missing_credential() {
    let registry = Arc::new(ModelRegistry::new(
        Arc::new(ScriptedFactory::default()),
        Arc::new(BrokenStore),
    ));
    let dispatcher = Dispatcher::new(Arc::new(ConversationMemory::new("S", 2)), registry);

    let err = dispatcher.reply("u1", "hello").await.unwrap_err();
    assert!(matches!(err, BridgeError::Storage(_)));
    assert_eq!(err.user_message(), MSG_STORAGE);
    assert!(!err.is_actionable());
    assert!(!dispatcher.memory().contains("u1").await);

    let err = dispatcher.generate_image("u1", "x").await.unwrap_err();
    assert_eq!(err.user_message(), MSG_STORAGE);
}

#[tokio::test]
async fn test_generate_image_uses_handle() {
    let f = fixture(&[("u1", "sk-one")]).await;
    let url = f.dispatcher.generate_image("u1", "a red fox").await.unwrap();
    assert_eq!(url, "https://images.test/a-red-fox.png");
    assert!(!f.dispatcher.memory().contains("u1").await);

    let err = f.dispatcher.generate_image("u2", "x").await.unwrap_err();
    assert!(matches!(err, BridgeError::Model(ModelError::NoCredential(ref user)) if user == "u2"));
}

#[tokio::test]
async fn test_concurrent_users_are_isolated() {
    let credentials: Vec<(String, String)> = (0..8)
        .map(|i| (format!("u{}", i), format!("sk-{}", i)))
        .collect();
    let refs: Vec<(&str, &str)> = credentials
        .iter()
        .map(|(u, k)| (u.as_str(), k.as_str()))
        .collect();
    let f = fixture(&refs).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let dispatcher = f.dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            let user = format!("u{}", i);
            for turn in 0..3 {
                dispatcher
                    .reply(&user, &format!("{}-{}", user, turn))
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for i in 0..8 {
        let user = format!("u{}", i);
        let messages = f.dispatcher.memory().get_messages(&user).await;
        assert_eq!(messages.len(), 5);
        assert!(messages
            .iter()
            .skip(1)
            .all(|m| m.content.contains(&format!("{}-", user))));
    }
}
