use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use tower_http::services::{ServeDir, ServeFile};

use crate::handlers::{chat, health_check, latest};
use crate::state::AppState;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let static_dir = PathBuf::from(&state.config.server.static_dir);

    Router::new()
        // Chat UI
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))

        // Chat relay
        .route("/chat", post(chat))

        // Status
        .route("/api/health", get(health_check))
        .route("/api/latest", get(latest))
}
