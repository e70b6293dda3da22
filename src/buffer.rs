use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Returned by [`ResponseBuffer::get`] when nothing has been written yet.
pub const THINKING_PLACEHOLDER: &str = "I'm thinking about your question...";

/// JSON shape of the latest agent output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestResponse {
    pub message: String,
}

/// Single-slot store for the most recent agent-produced message.
///
/// Every write overwrites the previous value; no history is kept.
/// Each chat request owns its own buffer, so concurrent requests
/// never observe one another's results.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    slot: RwLock<Option<String>>,
}

impl ResponseBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer already holding `message`
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(message.into())),
        }
    }

    /// Overwrite the stored message
    pub fn set(&self, message: impl Into<String>) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(message.into());
    }

    /// Current message, or [`THINKING_PLACEHOLDER`] if unset
    pub fn get(&self) -> String {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| THINKING_PLACEHOLDER.to_string())
    }

    pub fn is_set(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn snapshot(&self) -> LatestResponse {
        LatestResponse { message: self.get() }
    }
}
