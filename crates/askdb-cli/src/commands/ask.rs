//! `askdb ask` — Answer one question and print the response JSON.

use askdb_core::models::QueryResponse;
use askdb_core::AskConfig;

use super::{init_state, print_json};

pub async fn run(config: &AskConfig, question: &str, history: Vec<String>) -> Result<(), String> {
    if question.trim().is_empty() {
        return Err("question must not be empty".to_string());
    }

    let state = init_state(config)?;
    let report = tokio::time::timeout(
        state.request_timeout,
        state.orchestrator.run(question, history),
    )
    .await
    .map_err(|_| format!("no answer within {}s", state.request_timeout.as_secs()))?
    .map_err(|e| e.to_string())?;

    tracing::info!(
        "[Ask] run {} finished as {:?} after {} attempt(s)",
        report.run_id,
        report.terminal,
        report.attempts()
    );

    let response = QueryResponse::from_report(&report);
    let value = serde_json::to_value(&response).map_err(|e| e.to_string())?;
    print_json(&value);
    Ok(())
}
