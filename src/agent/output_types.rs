use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::input_types::{ChatMessage, ToolCall};

/// An event emitted by the agent while it works through an instruction.
///
/// Assistant events put free text first, followed by one block per tool
/// the model asked for. Tool results come back as a "user" event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<ToolUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

/// Record of the agent invoking a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    pub tool_use_id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_use_id: String,
    pub status: ToolStatus,
    pub content: Vec<ToolResultContent>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn tool_use(tool_use: ToolUse) -> Self {
        Self {
            tool_use: Some(tool_use),
            ..Default::default()
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            tool_result: Some(result),
            ..Default::default()
        }
    }
}

impl ToolUse {
    /// Build a tool-use record from a model tool call.
    /// Arguments that are not valid JSON become an empty object.
    pub fn from_call(call: &ToolCall) -> Self {
        let input = serde_json::from_str(&call.function.arguments)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self {
            tool_use_id: call.id.clone(),
            name: call.function.name.clone(),
            input,
        }
    }
}

impl ToolResult {
    pub fn success(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            status: ToolStatus::Success,
            content: vec![ToolResultContent { text: text.into() }],
        }
    }

    pub fn error(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            status: ToolStatus::Error,
            content: vec![ToolResultContent { text: text.into() }],
        }
    }

    /// All text content joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AgentEvent {
    pub fn new(role: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }

    /// Convert a model reply into an event. Empty text is left out, so a
    /// reply made only of tool calls starts with a tool-use block.
    pub fn from_message(message: &ChatMessage) -> Self {
        let mut content = Vec::new();

        if let Some(text) = message.content.as_deref().filter(|t| !t.is_empty()) {
            content.push(ContentBlock::text(text));
        }

        for call in message.requested_tools() {
            content.push(ContentBlock::tool_use(ToolUse::from_call(call)));
        }

        Self::new(message.role.clone(), content)
    }

    /// Event carrying tool results back into the conversation
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self::new(
            "user",
            results.into_iter().map(ContentBlock::tool_result).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_message_orders_text_before_tool_use() {
        let message = ChatMessage::assistant_with_tools(
            Some("Let me ask you something.".to_string()),
            vec![ToolCall::new(
                "call_1",
                "handoff_to_user",
                r#"{"message":"Favorite color?"}"#,
            )],
        );

        let event = AgentEvent::from_message(&message);
        assert!(event.is_assistant());
        assert_eq!(event.content.len(), 2);
        assert_eq!(event.content[0].text.as_deref(), Some("Let me ask you something."));
        let tool_use = event.content[1].tool_use.as_ref().unwrap();
        assert_eq!(tool_use.tool_use_id, "call_1");
        assert_eq!(tool_use.input["message"], "Favorite color?");
    }

    #[test]
    fn test_invalid_arguments_become_empty_object() {
        let call = ToolCall::new("call_2", "handoff_to_user", "not json");
        assert_eq!(ToolUse::from_call(&call).input, json!({}));
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let event = AgentEvent::new(
            "assistant",
            vec![ContentBlock::tool_use(ToolUse {
                tool_use_id: "t1".to_string(),
                name: "handoff_to_user".to_string(),
                input: json!({"message": "hi"}),
            })],
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["content"][0]["toolUse"]["toolUseId"], "t1");
    }
}
