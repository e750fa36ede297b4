//! Settings shared by every per-user client: endpoint, chat model and image size.

use bridge_core::BridgeConfig;

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub image_size: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: openai_client::DEFAULT_BASE_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            image_size: "512x512".to_string(),
        }
    }
}

impl From<&BridgeConfig> for LlmSettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            base_url: config.openai_base_url.clone(),
            model: config.ai_model.clone(),
            image_size: config.image_size.clone(),
        }
    }
}
