//! SQLite database layer queried by askdb.
//!
//! Uses rusqlite with WAL mode for concurrent read performance.
//! All database operations are executed via `tokio::task::spawn_blocking`
//! to avoid blocking the async runtime. The connection lock is held for a
//! single closure only, so concurrent runs interleave statement by statement.

mod demo;

pub use demo::DEMO_SQL;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::ServerError;

/// Thread-safe handle to the SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a SQLite database at the given path.
    pub fn open(db_path: &str) -> Result<Self, ServerError> {
        let path = Path::new(db_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(db_path)
            .map_err(|e| ServerError::Database(format!("Failed to open database: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| ServerError::Database(format!("Failed to set pragmas: {}", e)))?;

        tracing::info!("SQLite database opened at: {}", db_path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, ServerError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ServerError::Database(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| ServerError::Database(format!("Failed to set pragmas: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a closure with access to the database connection.
    /// Automatically handles locking and error conversion.
    ///
    /// Driver errors are reported as `ServerError::Database` carrying the
    /// driver's message unchanged.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ServerError::Database(format!("Lock poisoned: {}", e)))?;
        f(&conn).map_err(|e| ServerError::Database(e.to_string()))
    }

    /// Execute a closure with access to the database connection (async-friendly).
    pub async fn with_conn_async<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| ServerError::Database(format!("Task join error: {}", e)))?
    }

    /// Create and populate the demo `departments` / `employees` tables.
    ///
    /// Idempotent: existing demo tables are dropped and recreated.
    pub async fn seed_demo(&self) -> Result<(), ServerError> {
        self.with_conn_async(|conn| conn.execute_batch(DEMO_SQL)).await?;
        tracing::info!("Demo tables seeded (departments, employees)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_demo_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        db.seed_demo().await.unwrap();
        db.seed_demo().await.unwrap();

        let count: i64 = db
            .with_conn_async(|conn| {
                conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 8);
    }

    #[tokio::test]
    async fn test_driver_error_keeps_message() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .with_conn_async(|conn| conn.execute_batch("SELECT * FROM missing_table"))
            .await
            .unwrap_err();
        match err {
            ServerError::Database(msg) => assert!(msg.contains("no such table: missing_table")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("company.db");
        let db = Database::open(path.to_str().unwrap()).unwrap();
        db.with_conn(|conn| conn.execute_batch("CREATE TABLE t (id INTEGER)"))
            .unwrap();
        assert!(path.exists());
    }
}
