//! Tools the stylist agent can call

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::agent::output_types::{ToolResult, ToolUse};
use crate::buffer::ResponseBuffer;
use crate::error::ToolError;

pub const HANDOFF_TO_USER: &str = "handoff_to_user";
pub const REQUEST_USER_PREFERENCES: &str = "request_user_preferences";

const DEFAULT_HANDOFF_MESSAGE: &str = "Please provide input:";
const PREFERENCES_MESSAGE: &str =
    "Please share your fashion preferences (e.g., favorite colors, styles, articles of clothing).";

/// State a tool may touch during one invocation
pub struct ToolContext<'a> {
    pub buffer: &'a ResponseBuffer,
}

impl<'a> ToolContext<'a> {
    pub fn new(buffer: &'a ResponseBuffer) -> Self {
        Self { buffer }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the tool input
    fn input_schema(&self) -> Value;

    async fn call(
        &self,
        tool_use: &ToolUse,
        ctx: &ToolContext<'_>,
    ) -> Result<ToolResult, ToolError>;
}

/// Hands control back to the user with a question.
///
/// The question replaces the response buffer content, so the UI shows it
/// while the agent waits for the next message.
pub struct HandoffToUser;

impl HandoffToUser {
    pub fn handoff(tool_use: &ToolUse, buffer: &ResponseBuffer) -> Result<ToolResult, ToolError> {
        let input = tool_use
            .input
            .as_object()
            .ok_or_else(|| ToolError::InvalidInput {
                tool: HANDOFF_TO_USER.to_string(),
                reason: "input must be an object".to_string(),
            })?;

        let message = match input.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => DEFAULT_HANDOFF_MESSAGE.to_string(),
            Some(other) => other.to_string(),
        };
        let message = message.replace('\n', "<br>");

        buffer.set(message.clone());

        Ok(ToolResult::success(
            tool_use.tool_use_id.clone(),
            format!("Waiting for the next user input. Message: {}", message),
        ))
    }
}

#[async_trait]
impl Tool for HandoffToUser {
    fn name(&self) -> &str {
        HANDOFF_TO_USER
    }

    fn description(&self) -> &str {
        "Hand off control from agent to user for input"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Message to display to the user with context and instructions"
                }
            },
            "required": ["message"]
        })
    }

    async fn call(
        &self,
        tool_use: &ToolUse,
        ctx: &ToolContext<'_>,
    ) -> Result<ToolResult, ToolError> {
        Self::handoff(tool_use, ctx.buffer)
    }
}

/// Asks the user for their fashion preferences through a handoff
pub struct RequestUserPreferences;

#[async_trait]
impl Tool for RequestUserPreferences {
    fn name(&self) -> &str {
        REQUEST_USER_PREFERENCES
    }

    fn description(&self) -> &str {
        "Requests user preferences for fashion advice."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(
        &self,
        tool_use: &ToolUse,
        ctx: &ToolContext<'_>,
    ) -> Result<ToolResult, ToolError> {
        let handoff = ToolUse {
            tool_use_id: format!(
                "request_preferences_{}",
                chrono::Utc::now().timestamp_millis()
            ),
            name: HANDOFF_TO_USER.to_string(),
            input: json!({ "message": PREFERENCES_MESSAGE }),
        };
        info!(
            "Requesting user preferences ({} -> {})",
            tool_use.tool_use_id, handoff.tool_use_id
        );
        HandoffToUser::handoff(&handoff, ctx.buffer)
    }
}

/// Set of tools offered to the model
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stylist tools
    pub fn stylist() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HandoffToUser));
        registry.register(Arc::new(RequestUserPreferences));
        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions in OpenAI function-calling format
    pub fn specs(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.input_schema(),
                    }
                })
            })
            .collect()
    }
}
