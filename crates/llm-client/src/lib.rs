//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait (one client per API key, the "model handle"), the
//! [`LlmClientFactory`] that builds handles from a key, and the OpenAI implementation.
//! Both traits are object safe so the dispatcher can hold `Arc<dyn LlmClient>`.

use async_trait::async_trait;
use bridge_core::ModelError;
use openai_client::{
    normalize_error, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;

mod config;
mod openai_llm;

pub use config::LlmSettings;
pub use openai_llm::{OpenAILlmClient, OpenAILlmFactory};

/// A model handle bound to one credential.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply for the full ordered message list (system entry included).
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ModelError>;

    /// Generates an image for `prompt` and returns its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, ModelError>;

    /// Checks the bound credential against the API.
    async fn validate_credential(&self) -> Result<(), ModelError>;
}

/// Builds model handles from API keys.
pub trait LlmClientFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Arc<dyn LlmClient>;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, ModelError> {
    let content = msg.content.clone();
    let built: Result<ChatCompletionRequestMessage, _> = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
    };
    built.map_err(normalize_error)
}
