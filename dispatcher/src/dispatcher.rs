use crate::registry::ModelRegistry;
use bridge_core::{BridgeError, ModelError};
use memory::ConversationMemory;
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Sends a user's turn to their model with the conversation so far.
///
/// Callers serialize calls per user (the session router does); concurrent turns of different
/// users are independent.
#[derive(Clone)]
pub struct Dispatcher {
    memory: Arc<ConversationMemory>,
    registry: Arc<ModelRegistry>,
}

impl Dispatcher {
    pub fn new(memory: Arc<ConversationMemory>, registry: Arc<ModelRegistry>) -> Self {
        Self { memory, registry }
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Appends `text` as a user entry, asks the model and records its answer.
    ///
    /// - No credential or unreadable store: error, memory untouched.
    /// - Upstream failure: the user entry stays so the turn can be retried; retrying the same text
    ///   does not append it twice.
    /// - Malformed response: logged, no assistant entry.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn reply(&self, user_id: &str, text: &str) -> Result<String, BridgeError> {
        let handle = self.registry.resolve(user_id).await?;

        let pending = ChatMessage::user(text);
        let is_retry = self.memory.last_entry(user_id).await.as_ref() == Some(&pending);
        if is_retry {
            debug!(user_id = %user_id, "step: retrying dangling user entry");
        } else {
            self.memory.append(user_id, MessageRole::User, text).await;
        }

        let messages = self.memory.get_messages(user_id).await;
        debug!(user_id = %user_id, message_count = messages.len(), "step: calling model");

        match handle.get_llm_response_with_messages(messages).await {
            Ok(answer) => {
                self.memory
                    .append(user_id, MessageRole::Assistant, &answer)
                    .await;
                info!(user_id = %user_id, answer_len = answer.len(), "Reply recorded");
                Ok(answer)
            }
            Err(e @ ModelError::MalformedResponse(_)) => {
                error!(user_id = %user_id, error = %e, "Model returned a malformed response");
                Err(e.into())
            }
            Err(e @ ModelError::InvalidRequest(_)) => {
                error!(user_id = %user_id, error = %e, "Model request could not be built");
                Err(e.into())
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Model call failed");
                Err(e.into())
            }
        }
    }

    /// Generates an image for `prompt` with the user's handle. Memory is not involved.
    #[instrument(skip(self, prompt))]
    pub async fn generate_image(
        &self,
        user_id: &str,
        prompt: &str,
    ) -> Result<String, BridgeError> {
        let handle = self.registry.resolve(user_id).await?;
        let url = handle.generate_image(prompt).await.map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Image generation failed");
            e
        })?;
        info!(user_id = %user_id, "Image generated");
        Ok(url)
    }
}
