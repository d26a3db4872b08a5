//! `askdb seed-demo` — Create the demo tables in the configured database.

use askdb_core::AskConfig;

use super::open_database;

pub async fn run(config: &AskConfig) -> Result<(), String> {
    let db = open_database(config)?;
    db.seed_demo().await.map_err(|e| e.to_string())?;
    println!(
        "Seeded demo tables (departments, employees) into {}",
        config.database.path
    );
    Ok(())
}
