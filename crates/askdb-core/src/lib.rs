//! askdb Core: transport-agnostic domain logic for answering questions
//! about a relational database.
//!
//! This crate contains the text-to-SQL workflow engine and the adapters it
//! drives: the generation client, the schema provider and the query
//! executor. It has **no HTTP framework dependency** by default, making it
//! suitable for use in:
//!
//! - HTTP servers (via `askdb-server`)
//! - CLI tools (via `askdb-cli`)
//!
//! # Feature Flags
//!
//! - `axum`: enables `IntoResponse` impl on `ServerError` for use in axum handlers.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod query;
pub mod schema;
pub mod state;
pub mod workflow;

// Convenience re-exports
pub use config::AskConfig;
pub use db::Database;
pub use error::ServerError;
pub use state::{AppState, AppStateInner};
