use serde::{Deserialize, Serialize};

use crate::workflow::{RunReport, Terminal};

/// Incoming question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub session_id: String,
    #[serde(default)]
    pub history: Vec<String>,
}

/// Body returned to the caller when a run reaches a terminal step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Answered { response: String, sql_used: String },
    Failed { response: String, sql_generated: String },
}

impl QueryResponse {
    pub fn from_report(report: &RunReport) -> Self {
        let state = &report.state;
        match report.terminal {
            Terminal::Succeeded => QueryResponse::Answered {
                response: state.result.clone(),
                sql_used: state.sql_query.clone(),
            },
            Terminal::Failed => QueryResponse::Failed {
                response: format!(
                    "I encountered an error: {}",
                    state.error.as_deref().unwrap_or("unknown error")
                ),
                sql_generated: state.sql_query.clone(),
            },
        }
    }

    pub fn response(&self) -> &str {
        match self {
            QueryResponse::Answered { response, .. } | QueryResponse::Failed { response, .. } => {
                response
            }
        }
    }
}
