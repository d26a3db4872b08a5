use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use tracing::Instrument;

use askdb_core::models::{QueryRequest, QueryResponse};
use askdb_core::{AppState, ServerError};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(answer_query))
}

async fn answer_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ServerError> {
    let Json(body) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    if body.query.trim().is_empty() {
        return Err(ServerError::BadRequest("query must not be empty".to_string()));
    }

    let span = tracing::info_span!("query", session_id = %body.session_id);
    let run = state
        .orchestrator
        .run(body.query, body.history)
        .instrument(span);

    let report = tokio::time::timeout(state.request_timeout, run)
        .await
        .map_err(|_| {
            ServerError::Timeout(format!(
                "query did not finish within {}s",
                state.request_timeout.as_secs()
            ))
        })??;

    Ok(Json(QueryResponse::from_report(&report)))
}
