use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the chat model client
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode model response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("model returned no choices")]
    EmptyResponse,
}

/// Errors raised when turning an agent event into display text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("assistant message has no content")]
    EmptyContent,

    #[error("first content block has no text")]
    MissingText,
}

/// Errors raised by tool implementations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid input for tool {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },
}

/// Errors surfaced by the `/chat` endpoint
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No JSON data received")]
    NoJson,

    #[error("No message provided")]
    NoMessage,

    #[error("{0}")]
    Agent(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::NoJson | RelayError::NoMessage => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            RelayError::Agent(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message, "response": message })),
            )
                .into_response(),
        }
    }
}
