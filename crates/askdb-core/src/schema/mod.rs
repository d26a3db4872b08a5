//! Schema provider: describes the target database to the SQL generator.
//!
//! Introspection failures are reported as `ServerError::Introspection` and
//! are fatal for a run: generating SQL against an empty schema would only
//! produce nonsense.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::db::Database;
use crate::error::ServerError;

/// Default number of example rows rendered per table.
pub const DEFAULT_SAMPLE_ROWS: usize = 3;

const MAX_CELL_CHARS: usize = 100;

#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn fetch(&self) -> Result<String, ServerError>;
}

/// Renders each table's `CREATE` statement followed by a few sample rows.
#[derive(Clone)]
pub struct SqliteSchemaProvider {
    db: Database,
    sample_rows: usize,
    tables: Option<Vec<String>>,
}

impl SqliteSchemaProvider {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            sample_rows: DEFAULT_SAMPLE_ROWS,
            tables: None,
        }
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    /// Restrict the description to the named tables.
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = if tables.is_empty() { None } else { Some(tables) };
        self
    }
}

/// One user table as stored in `sqlite_master`.
struct TableInfo {
    name: String,
    create_sql: String,
}

#[async_trait]
impl SchemaProvider for SqliteSchemaProvider {
    async fn fetch(&self) -> Result<String, ServerError> {
        let sample_rows = self.sample_rows;
        let allow = self.tables.clone();

        let tables = self
            .db
            .with_conn_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT name, sql FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL
                     ORDER BY name",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(TableInfo {
                            name: row.get(0)?,
                            create_sql: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(introspection_error)?;

        let tables = select_tables(tables, allow.as_deref())?;
        if tables.is_empty() {
            return Err(ServerError::Introspection(
                "database has no user tables".to_string(),
            ));
        }

        let schema = self
            .db
            .with_conn_async(move |conn| {
                let mut sections = Vec::with_capacity(tables.len());
                for table in &tables {
                    let mut section = table.create_sql.trim().to_string();
                    if sample_rows > 0 {
                        section.push_str("\n\n");
                        section.push_str(&sample_block(conn, &table.name, sample_rows)?);
                    }
                    sections.push(section);
                }
                Ok(sections.join("\n\n"))
            })
            .await
            .map_err(introspection_error)?;

        tracing::debug!("[Schema] Fetched schema ({} chars)", schema.len());
        Ok(schema)
    }
}

fn introspection_error(err: ServerError) -> ServerError {
    match err {
        ServerError::Database(msg) => ServerError::Introspection(msg),
        other => ServerError::Introspection(other.to_string()),
    }
}

fn select_tables(
    tables: Vec<TableInfo>,
    allow: Option<&[String]>,
) -> Result<Vec<TableInfo>, ServerError> {
    let Some(allow) = allow else {
        return Ok(tables);
    };

    let missing: Vec<&str> = allow
        .iter()
        .filter(|name| !tables.iter().any(|t| &t.name == *name))
        .map(|name| name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(ServerError::Introspection(format!(
            "unknown tables: {}",
            missing.join(", ")
        )));
    }

    Ok(tables
        .into_iter()
        .filter(|t| allow.contains(&t.name))
        .collect())
}

/// Render up to `limit` rows of `table` as a tab-separated comment block.
fn sample_block(conn: &Connection, table: &str, limit: usize) -> Result<String, rusqlite::Error> {
    let query = format!(
        "SELECT * FROM \"{}\" LIMIT {}",
        table.replace('"', "\"\""),
        limit
    );
    let mut stmt = conn.prepare(&query)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut lines = vec![columns.join("\t")];
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            cells.push(sample_cell(row.get_ref(idx)?));
        }
        lines.push(cells.join("\t"));
    }

    Ok(format!(
        "/*\n{} rows from {} table:\n{}\n*/",
        limit,
        table,
        lines.join("\n")
    ))
}

fn sample_cell(value: ValueRef<'_>) -> String {
    let text = match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{:?}", f),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
    };
    if text.chars().count() > MAX_CELL_CHARS {
        let truncated: String = text.chars().take(MAX_CELL_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn demo_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.seed_demo().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_fetch_describes_tables_with_samples() {
        let provider = SqliteSchemaProvider::new(demo_db().await);
        let schema = provider.fetch().await.unwrap();

        let departments = schema.find("CREATE TABLE departments").unwrap();
        let employees = schema.find("CREATE TABLE employees").unwrap();
        assert!(departments < employees, "tables are listed by name");
        assert!(schema.contains("3 rows from employees table:"));
        assert!(schema.contains("id\tname\temail\tdepartment_id\tsalary\thired_on"));
        assert!(schema.contains("1\tAlice Martin\talice@example.com\t1\t98000.0\t2019-03-04"));
        assert!(!schema.contains("Dan Okafor"), "only three sample rows");
    }

    #[tokio::test]
    async fn test_fetch_without_samples() {
        let provider = SqliteSchemaProvider::new(demo_db().await).with_sample_rows(0);
        let schema = provider.fetch().await.unwrap();
        assert!(schema.contains("CREATE TABLE employees"));
        assert!(!schema.contains("rows from"));
    }

    #[tokio::test]
    async fn test_table_allow_list() {
        let provider =
            SqliteSchemaProvider::new(demo_db().await).with_tables(vec!["departments".to_string()]);
        let schema = provider.fetch().await.unwrap();
        assert!(schema.contains("CREATE TABLE departments"));
        assert!(!schema.contains("CREATE TABLE employees"));
    }

    #[tokio::test]
    async fn test_unknown_allowed_table_is_error() {
        let provider =
            SqliteSchemaProvider::new(demo_db().await).with_tables(vec!["payroll".to_string()]);
        let err = provider.fetch().await.unwrap_err();
        assert!(matches!(err, ServerError::Introspection(ref msg) if msg.contains("payroll")));
    }

    #[tokio::test]
    async fn test_empty_database_is_error() {
        let provider = SqliteSchemaProvider::new(Database::open_in_memory().unwrap());
        let err = provider.fetch().await.unwrap_err();
        assert!(matches!(err, ServerError::Introspection(_)));
    }
}
