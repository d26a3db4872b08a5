use serde::{Deserialize, Serialize};

/// The mutable record threaded through every step of one run.
///
/// Created per request, owned by the run that executes it and dropped once
/// the run reaches a terminal step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    question: String,

    /// Prior turns, passed through untouched.
    pub chat_history: Vec<String>,

    /// Filled once by FetchSchema.
    pub schema: String,

    /// SQL of the latest generation attempt.
    pub sql_query: String,

    /// Latest successful execution result, later replaced by the summary.
    pub result: String,

    /// Diagnostic of the latest failed attempt.
    pub error: Option<String>,

    /// Failed attempts so far in this run.
    pub retry_count: u32,
}

impl SessionState {
    pub fn new(question: impl Into<String>, chat_history: Vec<String>) -> Self {
        Self {
            question: question.into(),
            chat_history,
            ..Default::default()
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Forget everything a previous run left behind, keeping the question
    /// and history.
    pub(crate) fn begin_run(&mut self, schema: String) {
        self.schema = schema;
        self.sql_query.clear();
        self.result.clear();
        self.error = None;
        self.retry_count = 0;
    }

    /// Record a failed attempt: keep the diagnostic and count it.
    pub(crate) fn record_failure(&mut self, diagnostic: String) {
        self.result.clear();
        self.error = Some(diagnostic);
        self.retry_count += 1;
    }

    /// Record a successful execution.
    pub(crate) fn record_success(&mut self, rendered: String) {
        self.result = rendered;
        self.error = None;
    }
}
