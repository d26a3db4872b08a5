//! Query executor: runs generated SQL and classifies the outcome.
//!
//! The orchestrator never inspects result text to decide whether a query
//! failed: every executor returns an explicit [`QueryOutcome`].

mod sqlite;

pub use sqlite::{SqliteQueryExecutor, DEFAULT_MAX_ROWS};

use async_trait::async_trait;

/// Outcome of executing one SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Rendered result set (or affected-row count for statements without columns).
    Success(String),
    /// Driver diagnostic describing why the statement failed.
    Failure(String),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success(_))
    }
}

/// Executes SQL against the target database.
///
/// Implementations must sanitize the input with [`sanitize_sql`] and must
/// never panic or propagate an error: every failure becomes
/// [`QueryOutcome::Failure`].
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> QueryOutcome;
}

/// Strip markdown code fences from generated SQL.
///
/// Removes every "```sql" and "```" marker, then trims surrounding
/// whitespace. Applying it to already-clean text is a no-op.
pub fn sanitize_sql(raw: &str) -> String {
    raw.replace("```sql", "").replace("```", "").trim().to_string()
}
