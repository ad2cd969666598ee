//! OpenAI-compatible client construction.
//!
//! The completion service is any endpoint speaking the OpenAI chat API (Groq by default).

use crate::config::LlmSettings;
use crate::error::{Result, TubenotesError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client for the configured endpoint with the given request timeout.
pub fn create_client(settings: &LlmSettings, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = http_client(timeout)?;

    let mut config = OpenAIConfig::new().with_api_base(settings.base_url.trim_end_matches('/'));
    if let Some(key) = &settings.api_key {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Shared reqwest client builder used by every API wrapper.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tubenotes/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TubenotesError::Config(format!("Failed to create HTTP client: {}", e)))
}
