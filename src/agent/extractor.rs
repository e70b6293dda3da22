//! Turns structured agent events into the plain text shown in the UI

use tracing::{debug, warn};

use crate::agent::agents::EventHandler;
use crate::agent::output_types::AgentEvent;
use crate::buffer::ResponseBuffer;
use crate::error::ExtractError;

/// Extract display text from an assistant event.
///
/// The first content block must carry text. If a second block holds a
/// tool-use record whose input has a non-empty `message`, it is appended
/// after a blank line.
pub fn extract_display_text(event: &AgentEvent) -> Result<String, ExtractError> {
    let first = event.content.first().ok_or(ExtractError::EmptyContent)?;
    let mut text = first.text.clone().ok_or(ExtractError::MissingText)?;

    let tool_message = event
        .content
        .get(1)
        .and_then(|block| block.tool_use.as_ref())
        .and_then(|tool_use| tool_use.input.get("message"))
        .and_then(|message| message.as_str())
        .filter(|message| !message.is_empty());

    if let Some(message) = tool_message {
        text.push_str("\n\n");
        text.push_str(message);
    }

    Ok(text)
}

/// Writes the text of each assistant event into a response buffer.
///
/// Other roles are ignored. Malformed events are logged and leave the
/// buffer as it was.
pub struct MessageBufferHandler<'a> {
    buffer: &'a ResponseBuffer,
}

impl<'a> MessageBufferHandler<'a> {
    pub fn new(buffer: &'a ResponseBuffer) -> Self {
        Self { buffer }
    }
}

impl EventHandler for MessageBufferHandler<'_> {
    fn on_event(&self, event: &AgentEvent) {
        if !event.is_assistant() {
            return;
        }

        match extract_display_text(event) {
            Ok(text) => {
                debug!("Assistant text: {}", text);
                self.buffer.set(text);
            }
            Err(e) => warn!("Error in message buffer handler: {}", e),
        }
    }
}
