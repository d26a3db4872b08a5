//! `askdb schema` — Print the schema description handed to the SQL generator.

use askdb_core::schema::{SchemaProvider, SqliteSchemaProvider};
use askdb_core::{AskConfig, Database};

use super::open_database;

pub async fn run(config: &AskConfig) -> Result<(), String> {
    let db = open_database(config)?;
    println!("{}", describe(config, db).await?);
    Ok(())
}

pub async fn describe(config: &AskConfig, db: Database) -> Result<String, String> {
    SqliteSchemaProvider::new(db)
        .with_sample_rows(config.database.sample_rows)
        .with_tables(config.database.tables.clone())
        .fetch()
        .await
        .map_err(|e| e.to_string())
}
