mod agent;
mod buffer;
mod config;
mod error;
mod handlers;
mod routes;
mod state;

use anyhow::Result;
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stylist_relay=debug,tower_http=debug")),
        )
        .init();

    // Load configuration - try multiple paths, fall back to defaults
    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("config/conf.yaml".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut config = None;
    for path in &config_paths {
        if !std::path::Path::new(path).exists() {
            continue;
        }
        match Config::load(path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                config = Some(cfg);
                break;
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}", path, e);
            }
        }
    }

    let mut config = config.unwrap_or_else(|| {
        info!("No config file found in {:?}, using defaults", config_paths);
        Config::default()
    });
    config.apply_env_overrides();

    info!("Environment variables:");
    for key in ["LLM_URL", "LLM_MODEL", "MODEL_ID"] {
        match std::env::var(key) {
            Ok(value) => info!("- {}: {}", key, value),
            Err(_) => warn!("- {}: not set", key),
        }
    }
    info!(
        "Agent model: {} at {} (max_tokens={}, temperature={})",
        config.llm.model, config.llm.base_url, config.llm.max_tokens, config.llm.temperature
    );

    // Initialize app state
    let app_state = AppState::new(config.clone())?;

    // Build application
    let app = Router::new()
        .merge(routes::create_routes(&app_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    // Start server
    let ip: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
