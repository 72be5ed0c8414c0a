use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::LlmClient;
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::{GenerationParams, LocalLlamaClient, OpenAiClient};

pub struct LlmFactory;

#[derive(Debug, thiserror::Error)]
pub enum LlmFactoryError {
    #[error("missing API key: OpenAI-compatible LLM requires llm.api_key or OPENAI_API_KEY")]
    MissingApiKey,
    #[error("model initialization failed: {0}")]
    InitializationFailed(String),
}

impl LlmFactory {
    /// Builds the single language model shared by every session.
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmFactoryError> {
        match settings.provider {
            LlmProvider::Local => {
                let params = GenerationParams {
                    context_window: settings.context_window,
                    max_tokens: settings.max_tokens,
                    temperature: f64::from(settings.temperature),
                };
                let client = LocalLlamaClient::new(
                    &settings.model_repo,
                    &settings.model_file,
                    &settings.tokenizer_repo,
                    params,
                )
                .map_err(|e| LlmFactoryError::InitializationFailed(e.to_string()))?;
                Ok(Arc::new(client))
            }
            LlmProvider::OpenAi => {
                let key = settings
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .filter(|k| !k.is_empty())
                    .ok_or(LlmFactoryError::MissingApiKey)?;
                tracing::info!(
                    model = %settings.chat_model,
                    base_url = %settings.base_url,
                    "Using OpenAI-compatible chat model"
                );
                let client = OpenAiClient::new(
                    &settings.base_url,
                    key,
                    settings.chat_model.clone(),
                    settings.max_tokens,
                    settings.temperature,
                    Duration::from_secs(settings.timeout_secs),
                )
                .map_err(|e| LlmFactoryError::InitializationFailed(e.to_string()))?;
                Ok(Arc::new(client))
            }
        }
    }
}
