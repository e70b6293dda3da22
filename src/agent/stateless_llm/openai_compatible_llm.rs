use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use super::stateless_llm_interface::StatelessLLMInterface;
use crate::agent::input_types::ChatMessage;
use crate::config::LlmConfig;
use crate::error::LlmError;

/// OpenAI compatible LLM implementation
/// Talks to any server exposing `/chat/completions`
pub struct OpenAICompatibleLLM {
    client: Client,
    model: String,
    base_url: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl OpenAICompatibleLLM {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(LlmError::Client)?;

        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            config.model, config.base_url
        );

        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[Value],
    ) -> Result<ChatMessage, LlmError> {
        let mut request_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            request_messages.push(ChatMessage::system(sys));
        }
        request_messages.extend_from_slice(messages);

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: request_messages,
            tools: (!tools.is_empty()).then_some(tools),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending {} messages to {}", body.messages.len(), url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|source| LlmError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Model endpoint returned {}: {}", status, body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(LlmError::Decode)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(LlmError::EmptyResponse)
    }
}
