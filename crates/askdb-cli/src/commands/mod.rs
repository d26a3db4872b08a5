//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses
//! the askdb-core domain logic through `AppState`.

pub mod ask;
pub mod schema;
pub mod seed;
pub mod server;

use std::sync::Arc;

use askdb_core::{AppState, AppStateInner, AskConfig, Database};

/// Load configuration (file, then environment), with `--db` taking precedence.
pub fn load_config(config_path: Option<&str>, db_path: Option<&str>) -> Result<AskConfig, String> {
    let mut config = AskConfig::load(config_path).map_err(|e| e.to_string())?;
    if let Some(db_path) = db_path {
        config.database.path = db_path.to_string();
    }
    Ok(config)
}

/// Open the configured database.
pub fn open_database(config: &AskConfig) -> Result<Database, String> {
    Database::open(&config.database.path)
        .map_err(|e| format!("Failed to open database '{}': {}", config.database.path, e))
}

/// Initialize a shared `AppState` from the loaded configuration.
///
/// Mirrors `askdb_server::create_app_state` for commands that run the
/// workflow without the HTTP layer.
pub fn init_state(config: &AskConfig) -> Result<AppState, String> {
    let db = open_database(config)?;
    Ok(Arc::new(AppStateInner::new(db, config)))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
