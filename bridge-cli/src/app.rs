//! Wiring: config → credential store → model registry → dispatcher → session router.

use anyhow::{Context, Result};
use bridge_core::BridgeConfig;
use dispatcher::{Dispatcher, ModelRegistry};
use llm_client::{LlmClientFactory, LlmSettings, OpenAILlmFactory};
use memory::ConversationMemory;
use readers::{http_client, WebsiteReader, YoutubeReader};
use session::SessionRouter;
use std::sync::Arc;
use std::time::Duration;
use storage::CredentialStore;
use tracing::info;

pub struct App {
    pub router: SessionRouter,
    pub store: Arc<dyn CredentialStore>,
}

impl App {
    /// Opens the configured store and hydrates the model handles from it.
    pub async fn build(config: &BridgeConfig) -> Result<Self> {
        let store = storage::open_store(&config.storage)
            .await
            .context("Open credential store")?;
        let factory = Arc::new(OpenAILlmFactory::new(LlmSettings::from(config)));
        Self::with_parts(config, store, factory).await
    }

    pub async fn with_parts(
        config: &BridgeConfig,
        store: Arc<dyn CredentialStore>,
        factory: Arc<dyn LlmClientFactory>,
    ) -> Result<Self> {
        let registry = Arc::new(ModelRegistry::new(factory, store.clone()));
        let users = registry.hydrate().await;

        let memory = Arc::new(ConversationMemory::new(
            config.system_message.clone(),
            config.memory_message_count,
        ));
        let client = http_client(Duration::from_secs(config.reader_timeout_secs))
            .context("Build reader HTTP client")?;
        let video = YoutubeReader::new(client.clone(), config.youtube_step);
        let web = WebsiteReader::new(client).with_max_chars(config.website_max_chars);

        let router = SessionRouter::new(
            Dispatcher::new(memory, registry),
            Arc::new(video),
            Arc::new(web),
        );
        info!(
            users,
            model = %config.ai_model,
            memory_message_count = config.memory_message_count,
            "Chat bridge ready"
        );
        Ok(Self { router, store })
    }

    /// Registered users sorted by id, keys masked.
    pub async fn masked_users(&self) -> Result<Vec<(String, String)>> {
        let mut users: Vec<(String, String)> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .map(|(user_id, key)| (user_id, openai_client::mask_token(&key)))
            .collect();
        users.sort();
        Ok(users)
    }
}
