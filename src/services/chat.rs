use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use tracing::{debug, error};

use super::ServiceError;
use crate::config::OpenAiConfig;
use crate::error::FrameworkError;

/// Environment variable holding the chat API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Posts a JSON payload to a chat-completion endpoint and returns the decoded
/// JSON answer (HTTP client, recorded fixture, test double...).
///
/// Non-success statuses and undecodable bodies are transport errors.
pub trait ChatTransport: Send + Sync {
    fn post_json(&self, url: &str, api_key: &str, payload: &Value) -> Result<Value, ServiceError>;
}

/// Single-message chat completion with config defaults. Failures are logged
/// and come back as `None`.
pub struct ChatService {
    config: OpenAiConfig,
    api_key: String,
    transport: Arc<dyn ChatTransport>,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("api_url", &self.config.api_url)
            .field("default_model", &self.config.default_model)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] when `api_key` is empty.
    pub fn new(
        config: OpenAiConfig,
        api_key: impl Into<String>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, FrameworkError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(FrameworkError::configuration(format!(
                "OpenAI API key not set. Provide it in .env as {API_KEY_VAR}."
            )));
        }
        Ok(Self {
            config,
            api_key,
            transport,
        })
    }

    /// Like [`ChatService::new`], with the key taken from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Configuration`] when the variable is unset or empty.
    pub fn from_env(
        config: OpenAiConfig,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, FrameworkError> {
        Self::new(config, env::var(API_KEY_VAR).unwrap_or_default(), transport)
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }

    /// Ask for a completion of `message`. `model` and `temperature` fall back
    /// to the configured defaults. Returns the trimmed content of the first
    /// choice.
    pub fn chat_completion(
        &self,
        message: &str,
        model: Option<&str>,
        temperature: Option<f64>,
    ) -> Option<String> {
        let model = model.unwrap_or(&self.config.default_model);
        let temperature = temperature.unwrap_or(self.config.default_temperature);
        let payload = json!({
            "model": model,
            "messages": [{ "role": "user", "content": message }],
            "temperature": temperature,
        });

        let response = match self
            .transport
            .post_json(&self.endpoint(), &self.api_key, &payload)
        {
            Ok(response) => response,
            Err(e) => {
                error!(model = %model, error = %e, "Chat completion request failed");
                return None;
            }
        };

        let content = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string());
        if content.is_none() {
            debug!(model = %model, "Chat completion response has no message content");
        }
        content
    }
}
