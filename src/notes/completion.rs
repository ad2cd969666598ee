//! Chat completion over an OpenAI-compatible endpoint.

use crate::config::LlmSettings;
use crate::error::{Result, TubenotesError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for single-turn chat completions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt` under the `system` message at the given temperature.
    async fn complete(&self, system: &str, prompt: &str, temperature: f32) -> Result<String>;
}

/// Completion client for Groq, OpenAI or any other compatible API.
pub struct OpenAiCompletion {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(settings: &LlmSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(settings, timeout)?,
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletion {
    #[instrument(skip(self, system, prompt), fields(model = %self.model))]
    async fn complete(&self, system: &str, prompt: &str, temperature: f32) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| TubenotesError::Completion(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| TubenotesError::Completion(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(|e| TubenotesError::Completion(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            TubenotesError::Completion(format!("Failed to generate completion: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TubenotesError::Completion("Empty response from LLM".to_string()))?
            .clone();

        debug!("Completion returned {} chars", content.len());
        Ok(content)
    }
}
