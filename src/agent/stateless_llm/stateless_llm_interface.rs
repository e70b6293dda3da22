use async_trait::async_trait;
use serde_json::Value;

use crate::agent::input_types::ChatMessage;
use crate::error::LlmError;

/// Interface for a stateless language model
/// Stateless means the LLM doesn't store memory, system prompts, or user messages
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Generate one assistant message for the conversation so far.
    ///
    /// # Arguments
    /// * `messages` - Conversation memory, oldest first
    /// * `system` - Optional system prompt, sent ahead of `messages`
    /// * `tools` - Tool definitions in OpenAI function format
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[Value],
    ) -> Result<ChatMessage, LlmError>;
}
