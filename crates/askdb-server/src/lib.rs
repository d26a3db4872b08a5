//! askdb Server - natural-language questions over a SQL database
//!
//! A standalone Rust backend server for askdb, providing:
//! - `POST /api/query` (and `POST /query`) answering questions via the
//!   askdb-core workflow
//! - `GET /api/health`
//!
//! This crate can be used standalone (via `askdb server`) or embedded in
//! other applications.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use askdb_core::{AppState, AppStateInner, AskConfig, Database};

/// Configuration for the askdb backend server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub ask: AskConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            ask: AskConfig::default(),
        }
    }
}

/// Create a shared `AppState` from the loaded configuration.
pub async fn create_app_state(config: &AskConfig) -> Result<AppState, String> {
    let db = Database::open(&config.database.path)
        .map_err(|e| format!("Failed to open database: {}", e))?;

    Ok(Arc::new(AppStateInner::new(db, config)))
}

/// Start the askdb HTTP server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    // Initialize tracing (no-op when the host binary already did)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askdb_core=info,askdb_server=info,tower_http=info".into()),
        )
        .try_init();

    tracing::info!(
        "Starting askdb server on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state(&config.ask).await?;

    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
///
/// This variant is useful when the orchestrator is wired with custom
/// collaborators (other backends, test doubles).
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("askdb server listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

/// Build the complete router with middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/api/health", axum::routing::get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "server": "askdb-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
