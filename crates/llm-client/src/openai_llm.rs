//! OpenAI implementation of [`LlmClient`]: wraps openai-client and forwards the memory's
//! messages as-is (the system entry comes from conversation memory, not from here).

use async_trait::async_trait;
use bridge_core::ModelError;
use openai_client::ImageSize;
use prompt::ChatMessage;
use std::sync::Arc;
use tracing::instrument;

use super::{chat_message_to_openai, LlmClient, LlmClientFactory, LlmSettings};

#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
    image_size: ImageSize,
}

impl OpenAILlmClient {
    pub fn new(api_key: String, settings: &LlmSettings) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, settings.base_url.clone()),
            model: settings.model.clone(),
            image_size: openai_client::parse_image_size(&settings.image_size),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages), fields(model = %self.model, message_count = messages.len()))]
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ModelError> {
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>, _>>()?;
        self.client.chat_completion(&self.model, openai_messages).await
    }

    #[instrument(skip(self, prompt))]
    async fn generate_image(&self, prompt: &str) -> Result<String, ModelError> {
        self.client.generate_image(prompt, self.image_size).await
    }

    async fn validate_credential(&self) -> Result<(), ModelError> {
        self.client.validate_key().await
    }
}

/// Factory producing [`OpenAILlmClient`]s that share one set of [`LlmSettings`].
#[derive(Debug, Clone, Default)]
pub struct OpenAILlmFactory {
    settings: LlmSettings,
}

impl OpenAILlmFactory {
    pub fn new(settings: LlmSettings) -> Self {
        Self { settings }
    }
}

impl LlmClientFactory for OpenAILlmFactory {
    fn create(&self, api_key: &str) -> Arc<dyn LlmClient> {
        Arc::new(OpenAILlmClient::new(api_key.to_string(), &self.settings))
    }
}
