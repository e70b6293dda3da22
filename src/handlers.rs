use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::agent::extractor::MessageBufferHandler;
use crate::agent::tools::ToolContext;
use crate::buffer::{LatestResponse, ResponseBuffer};
use crate::error::RelayError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatRequest {
    /// Validate a raw `/chat` body.
    ///
    /// A body that is missing, not JSON, `null` or `{}` counts as no data.
    /// Otherwise `message` must be a non-empty string.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let data: Value = serde_json::from_slice(body).map_err(|_| RelayError::NoJson)?;

        match &data {
            Value::Null => return Err(RelayError::NoJson),
            Value::Object(map) if map.is_empty() => return Err(RelayError::NoJson),
            _ => {}
        }

        let message = data
            .get("message")
            .and_then(|v| v.as_str())
            .filter(|m| !m.is_empty())
            .ok_or(RelayError::NoMessage)?;

        Ok(Self {
            message: message.to_string(),
        })
    }
}

pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, RelayError> {
    let request = ChatRequest::parse(&body)?;
    let request_id = Uuid::new_v4();

    async move {
        info!("Received message: {}", request.message);

        let instruction = state.config.agent.render_instruction(&request.message);
        let buffer = ResponseBuffer::new();
        let handler = MessageBufferHandler::new(&buffer);
        let ctx = ToolContext::new(&buffer);

        let outcome = state
            .agent
            .invoke(&instruction, &handler, &ctx)
            .await
            .map_err(|e| {
                let message = format!("{:#}", e);
                error!("Error in /chat endpoint: {}", message);
                RelayError::Agent(message)
            })?;
        debug!(
            "Agent finished after {} steps, final event has {} blocks",
            outcome.steps,
            outcome.last_event.content.len()
        );

        let response = buffer.get();
        if buffer.is_set() {
            state.latest.set(response.clone());
        }

        Ok::<_, RelayError>(Json(ChatResponse { response }))
    }
    .instrument(info_span!("chat", %request_id))
    .await
}

pub async fn latest(State(state): State<AppState>) -> Json<LatestResponse> {
    Json(state.latest.snapshot())
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.config.llm.model,
    }))
}
