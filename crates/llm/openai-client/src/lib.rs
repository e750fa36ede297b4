//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion, image generation and key validation.
//! Every failure is normalized into [`ModelError`]; raw library errors never leave this crate.
//! Provides token masking for safe logging.
//!
//! The underlying client never retries: async-openai's rate-limit backoff is disabled so the
//! caller decides what to do with an upstream error.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateChatCompletionRequestArgs, CreateImageRequestArgs, Image},
    Client,
};
use bridge_core::{ModelError, UpstreamKind};
use std::sync::Arc;
use std::time::Duration;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, ImageSize,
};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Request timeout applied to every API call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Classifies an API error body into an [`UpstreamKind`].
pub fn classify_api_error(code: Option<&str>, error_type: Option<&str>, message: &str) -> UpstreamKind {
    let code = code.unwrap_or_default();
    let error_type = error_type.unwrap_or_default();
    if code == "invalid_api_key" || message.contains("Incorrect API key") {
        UpstreamKind::InvalidCredential
    } else if code == "rate_limit_exceeded"
        || code == "insufficient_quota"
        || error_type == "insufficient_quota"
        || error_type == "requests"
        || error_type == "tokens"
    {
        UpstreamKind::RateLimited
    } else {
        UpstreamKind::Unavailable
    }
}

/// Maps an async-openai error into the bridge taxonomy.
pub fn normalize_error(err: OpenAIError) -> ModelError {
    match err {
        OpenAIError::ApiError(api) => {
            let kind = classify_api_error(api.code.as_deref(), api.r#type.as_deref(), &api.message);
            ModelError::upstream(kind, api.message)
        }
        OpenAIError::JSONDeserialize(e) => ModelError::MalformedResponse(e.to_string()),
        OpenAIError::InvalidArgument(msg) => ModelError::InvalidRequest(msg),
        OpenAIError::Reqwest(e) => ModelError::upstream(UpstreamKind::Unavailable, e.to_string()),
        other => ModelError::upstream(UpstreamKind::Unavailable, other.to_string()),
    }
}

/// Parses `"256x256"`, `"512x512"` or `"1024x1024"`; anything else falls back to 512x512.
pub fn parse_image_size(size: &str) -> ImageSize {
    match size.trim() {
        "256x256" => ImageSize::S256x256,
        "1024x1024" => ImageSize::S1024x1024,
        _ => ImageSize::S512x512,
    }
}

/// OpenAI client bound to one API key.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    /// API key stored only for logging (masked).
    masked_key: String,
}

impl OpenAIClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Builds a client with a custom base URL (e.g. for proxies or compatible endpoints).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let masked_key = mask_token(&api_key);
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let mut client = Client::with_config(config).with_backoff(no_retry);
        match reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build() {
            Ok(http) => client = client.with_http_client(http),
            Err(e) => tracing::warn!(error = %e, "Falling back to default HTTP client"),
        }
        Self {
            client: Arc::new(client),
            masked_key,
        }
    }

    /// Sends a chat completion request and returns the first choice's text.
    ///
    /// A response without choices or without text content is a
    /// [`ModelError::MalformedResponse`].
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<String, ModelError> {
        tracing::info!(
            model = %model,
            message_count = messages.len(),
            api_key = %self.masked_key,
            "OpenAI chat_completion request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .map_err(normalize_error)?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(normalize_error)?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::MalformedResponse("no choices in response".to_string()))?;
        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(ModelError::MalformedResponse(
                "first choice has no text content".to_string(),
            )),
        }
    }

    /// Generates one image and returns its URL.
    pub async fn generate_image(&self, prompt: &str, size: ImageSize) -> Result<String, ModelError> {
        tracing::info!(
            size = ?size,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            api_key = %self.masked_key,
            "OpenAI image generation request"
        );

        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .size(size)
            .n(1)
            .build()
            .map_err(normalize_error)?;

        let response = self
            .client
            .images()
            .create(request)
            .await
            .map_err(normalize_error)?;

        response
            .data
            .iter()
            .find_map(|image| match image.as_ref() {
                Image::Url { url, .. } => Some(url.clone()),
                _ => None,
            })
            .ok_or_else(|| ModelError::MalformedResponse("no image URL in response".to_string()))
    }

    /// Checks that the key is accepted by listing models.
    pub async fn validate_key(&self) -> Result<(), ModelError> {
        tracing::info!(api_key = %self.masked_key, "Validating OpenAI API key");
        self.client
            .models()
            .list()
            .await
            .map(|_| ())
            .map_err(normalize_error)
    }
}
