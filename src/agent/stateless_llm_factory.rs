use std::sync::Arc;
use tracing::info;
use anyhow::Result;

use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::agent::stateless_llm::openai_compatible_llm::OpenAICompatibleLLM;
use crate::agent::stateless_llm::ollama_llm::OllamaLLM;
use crate::config::LlmConfig;

/// Factory for creating stateless LLM instances
pub struct StatelessLLMFactory;

impl StatelessLLMFactory {
    /// Create an LLM based on the configuration.
    ///
    /// # Arguments
    /// * `config` - LLM configuration; `config.provider` selects the implementation
    pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn StatelessLLMInterface>> {
        info!("Initializing LLM: {}", config.provider);

        match config.provider.as_str() {
            "openai_compatible_llm" | "openai_llm" => {
                Ok(Arc::new(OpenAICompatibleLLM::new(config)?))
            }
            "ollama_llm" => Ok(Arc::new(OllamaLLM::new(config)?)),
            other => Err(anyhow::anyhow!("Unsupported LLM provider: {}", other)),
        }
    }
}
