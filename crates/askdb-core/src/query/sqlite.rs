use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{sanitize_sql, QueryExecutor, QueryOutcome};
use crate::db::Database;
use crate::error::ServerError;

/// Default cap on rendered rows.
pub const DEFAULT_MAX_ROWS: usize = 100;

/// Runs SQL against a [`Database`] and renders rows as a list of tuples,
/// e.g. `[(1, 'Alice'), (2, 'Bob')]`.
#[derive(Clone)]
pub struct SqliteQueryExecutor {
    db: Database,
    max_rows: usize,
}

impl SqliteQueryExecutor {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

#[async_trait]
impl QueryExecutor for SqliteQueryExecutor {
    async fn execute(&self, sql: &str) -> QueryOutcome {
        let sql = sanitize_sql(sql);
        if sql.is_empty() {
            return QueryOutcome::Failure("empty SQL statement".to_string());
        }

        tracing::debug!("[Query] Executing: {}", sql);

        let max_rows = self.max_rows;
        match self
            .db
            .with_conn_async(move |conn| run_statement(conn, &sql, max_rows))
            .await
        {
            Ok(rendered) => QueryOutcome::Success(rendered),
            Err(ServerError::Database(msg)) => {
                tracing::warn!("[Query] Statement failed: {}", msg);
                QueryOutcome::Failure(msg)
            }
            Err(other) => {
                tracing::warn!("[Query] Statement failed: {}", other);
                QueryOutcome::Failure(other.to_string())
            }
        }
    }
}

fn run_statement(conn: &Connection, sql: &str, max_rows: usize) -> Result<String, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();

    if column_count == 0 {
        let affected = stmt.execute([])?;
        return Ok(format!("{} row(s) affected", affected));
    }

    let mut rows = stmt.query([])?;
    let mut rendered: Vec<String> = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows.next()? {
        if rendered.len() == max_rows {
            truncated = true;
            break;
        }
        let mut cells = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            cells.push(render_value(row.get_ref(idx)?));
        }
        rendered.push(render_tuple(&cells));
    }

    let mut out = format!("[{}]", rendered.join(", "));
    if truncated {
        out.push_str(" ... (truncated)");
    }
    Ok(out)
}

/// Render a single SQLite value the way the result tuples display it.
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{:?}", f),
        ValueRef::Text(bytes) => quote_text(&String::from_utf8_lossy(bytes)),
        ValueRef::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
    }
}

/// Quote text as a Python string literal: single quotes unless the text
/// holds a single quote and no double quote.
fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn render_tuple(cells: &[String]) -> String {
    if cells.len() == 1 {
        format!("({},)", cells[0])
    } else {
        format!("({})", cells.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn demo_executor() -> SqliteQueryExecutor {
        let db = Database::open_in_memory().unwrap();
        db.seed_demo().await.unwrap();
        SqliteQueryExecutor::new(db)
    }

    #[tokio::test]
    async fn test_count_renders_single_tuple() {
        let executor = demo_executor().await;
        let outcome = executor.execute("SELECT COUNT(*) FROM employees").await;
        assert_eq!(outcome, QueryOutcome::Success("[(8,)]".to_string()));
    }

    #[tokio::test]
    async fn test_fenced_sql_is_sanitized() {
        let executor = demo_executor().await;
        let outcome = executor
            .execute("```sql\nSELECT name, location FROM departments ORDER BY id LIMIT 2\n```")
            .await;
        assert_eq!(
            outcome,
            QueryOutcome::Success("[('Engineering', 'Berlin'), ('Sales', 'London')]".to_string())
        );
    }

    #[tokio::test]
    async fn test_values_render_by_type() {
        let executor = demo_executor().await;
        let outcome = executor
            .execute("SELECT 1, 2.5, NULL, 'it''s', x'0102'")
            .await;
        assert_eq!(
            outcome,
            QueryOutcome::Success("[(1, 2.5, None, \"it's\", <blob 2 bytes>)]".to_string())
        );
    }

    #[test]
    fn test_text_quoting() {
        assert_eq!(quote_text("Berlin"), "'Berlin'");
        assert_eq!(quote_text("it's"), "\"it's\"");
        assert_eq!(quote_text("say \"it's\""), "'say \"it\\'s\"'");
        assert_eq!(quote_text("a\\b\nc"), "'a\\\\b\\nc'");
    }

    #[tokio::test]
    async fn test_syntax_error_is_failure() {
        let executor = demo_executor().await;
        let outcome = executor.execute("SELEC COUNT(*) FROM employees").await;
        match outcome {
            QueryOutcome::Failure(msg) => assert!(msg.contains("syntax error"), "{}", msg),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_table_is_failure() {
        let executor = demo_executor().await;
        let outcome = executor.execute("SELECT * FROM staff").await;
        assert_eq!(outcome, QueryOutcome::Failure("no such table: staff".to_string()));
    }

    #[tokio::test]
    async fn test_empty_sql_is_failure() {
        let executor = demo_executor().await;
        let outcome = executor.execute("```sql\n```").await;
        assert_eq!(outcome, QueryOutcome::Failure("empty SQL statement".to_string()));
    }

    #[tokio::test]
    async fn test_statement_without_columns_reports_affected_rows() {
        let executor = demo_executor().await;
        let outcome = executor
            .execute("UPDATE employees SET salary = salary + 1 WHERE department_id = 2")
            .await;
        assert_eq!(outcome, QueryOutcome::Success("3 row(s) affected".to_string()));
    }

    #[tokio::test]
    async fn test_rows_are_capped() {
        let executor = demo_executor().await.with_max_rows(2);
        let outcome = executor.execute("SELECT id FROM employees ORDER BY id").await;
        assert_eq!(
            outcome,
            QueryOutcome::Success("[(1,), (2,)] ... (truncated)".to_string())
        );
    }
}
