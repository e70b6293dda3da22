use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::openai_compatible_llm::OpenAICompatibleLLM;
use super::stateless_llm_interface::StatelessLLMInterface;
use crate::agent::input_types::ChatMessage;
use crate::config::LlmConfig;
use crate::error::LlmError;

/// Ollama LLM implementation
/// Wraps OpenAICompatibleLLM since Ollama serves an OpenAI-compatible API under `/v1`
pub struct OllamaLLM {
    inner: OpenAICompatibleLLM,
}

impl OllamaLLM {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut config = config.clone();
        config.base_url = openai_base_url(&config.base_url);
        if config.api_key.is_none() {
            config.api_key = Some("ollama".to_string());
        }

        info!("Initialized OllamaLLM: model={}, base_url={}", config.model, config.base_url);

        Ok(Self {
            inner: OpenAICompatibleLLM::new(&config)?,
        })
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

/// `http://host:11434` -> `http://host:11434/v1`
fn openai_base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.ends_with("/v1") {
        host.to_string()
    } else {
        format!("{}/v1", host)
    }
}

#[async_trait]
impl StatelessLLMInterface for OllamaLLM {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[Value],
    ) -> Result<ChatMessage, LlmError> {
        self.inner.chat_completion(messages, system, tools).await
    }
}
