pub mod query;

use axum::Router;

use askdb_core::AppState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/query", query::router())
        .nest("/query", query::router())
}
