//! Shared application state for the server and CLI.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AskConfig;
use crate::db::Database;
use crate::llm::HttpGenerationClient;
use crate::query::SqliteQueryExecutor;
use crate::schema::SqliteSchemaProvider;
use crate::workflow::{Orchestrator, RetryPolicy};

/// Process-wide state: the database handle and the orchestrator built over it.
pub struct AppStateInner {
    pub db: Database,
    pub orchestrator: Orchestrator,
    pub request_timeout: Duration,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    /// Wire the SQLite schema provider, the SQLite executor and the HTTP
    /// generation client from `config`.
    pub fn new(db: Database, config: &AskConfig) -> Self {
        let generator = HttpGenerationClient::with_timeout(
            config.coder.clone(),
            config.explainer.clone(),
            Duration::from_secs(config.server.generation_timeout_secs),
        );
        let schema = SqliteSchemaProvider::new(db.clone())
            .with_sample_rows(config.database.sample_rows)
            .with_tables(config.database.tables.clone());
        let executor = SqliteQueryExecutor::new(db.clone()).with_max_rows(config.database.max_rows);

        let orchestrator = Orchestrator::new(Arc::new(generator), Arc::new(schema), Arc::new(executor))
            .with_policy(RetryPolicy::new(config.workflow.max_attempts));

        Self::with_orchestrator(
            db,
            orchestrator,
            Duration::from_secs(config.server.request_timeout_secs),
        )
    }

    /// Build state around a pre-built orchestrator (custom collaborators, tests).
    pub fn with_orchestrator(db: Database, orchestrator: Orchestrator, request_timeout: Duration) -> Self {
        Self {
            db,
            orchestrator,
            request_timeout,
        }
    }
}
