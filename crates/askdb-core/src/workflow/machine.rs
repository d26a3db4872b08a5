//! Steps, guards and the transition table.

use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Attempts allowed before a run is declared failed.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A node of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    FetchSchema,
    GenerateSql,
    ExecuteSql,
    Summarize,
    Succeeded,
    Failed,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::FetchSchema => "fetch_schema",
            Step::GenerateSql => "generate_sql",
            Step::ExecuteSql => "execute_sql",
            Step::Summarize => "summarize",
            Step::Succeeded => "succeeded",
            Step::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Succeeded | Step::Failed)
    }

    pub fn terminal(&self) -> Option<Terminal> {
        match self {
            Step::Succeeded => Some(Terminal::Succeeded),
            Step::Failed => Some(Terminal::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    Succeeded,
    Failed,
}

/// What a step's action observed; the guard half of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The action completed.
    Done,
    /// The action failed in a way that counts against the retry limit
    /// (a generation call failed before any SQL existed).
    AttemptFailed,
}

/// Bounded-count retry rule for the generate → execute loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Route after an attempt: retry, give up, or move on to the summary.
    pub fn route(&self, state: &SessionState) -> Step {
        match state.error {
            Some(_) if state.retry_count < self.max_attempts => Step::GenerateSql,
            Some(_) => Step::Failed,
            None => Step::Summarize,
        }
    }

    /// Upper bound on steps a run can visit, terminal included.
    pub fn max_steps(&self) -> usize {
        self.max_attempts as usize * 2 + 4
    }
}

/// Select the step that follows `step`.
pub fn transition(step: Step, signal: Signal, state: &SessionState, policy: &RetryPolicy) -> Step {
    match (step, signal) {
        (Step::FetchSchema, _) => Step::GenerateSql,
        (Step::GenerateSql, Signal::Done) => Step::ExecuteSql,
        (Step::GenerateSql, Signal::AttemptFailed) => policy.route(state),
        (Step::ExecuteSql, _) => policy.route(state),
        (Step::Summarize, _) => Step::Succeeded,
        (Step::Succeeded, _) => Step::Succeeded,
        (Step::Failed, _) => Step::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(error: Option<&str>, retry_count: u32) -> SessionState {
        let mut state = SessionState::new("q", vec![]);
        state.error = error.map(|e| e.to_string());
        state.retry_count = retry_count;
        state
    }

    #[test]
    fn test_unconditional_edges() {
        let policy = RetryPolicy::default();
        let state = state_with(None, 0);
        assert_eq!(transition(Step::FetchSchema, Signal::Done, &state, &policy), Step::GenerateSql);
        assert_eq!(transition(Step::GenerateSql, Signal::Done, &state, &policy), Step::ExecuteSql);
        assert_eq!(transition(Step::Summarize, Signal::Done, &state, &policy), Step::Succeeded);
    }

    #[test]
    fn test_generate_sql_ignores_stale_error_when_done() {
        let policy = RetryPolicy::default();
        let state = state_with(Some("syntax error near FROM"), 1);
        assert_eq!(transition(Step::GenerateSql, Signal::Done, &state, &policy), Step::ExecuteSql);
    }

    #[test]
    fn test_retry_policy_after_execute() {
        let policy = RetryPolicy::default();
        assert_eq!(
            transition(Step::ExecuteSql, Signal::Done, &state_with(None, 2), &policy),
            Step::Summarize
        );
        assert_eq!(
            transition(Step::ExecuteSql, Signal::Done, &state_with(Some("e"), 1), &policy),
            Step::GenerateSql
        );
        assert_eq!(
            transition(Step::ExecuteSql, Signal::Done, &state_with(Some("e"), 2), &policy),
            Step::GenerateSql
        );
        assert_eq!(
            transition(Step::ExecuteSql, Signal::Done, &state_with(Some("e"), 3), &policy),
            Step::Failed
        );
    }

    #[test]
    fn test_generation_failure_uses_retry_policy() {
        let policy = RetryPolicy::new(2);
        assert_eq!(
            transition(Step::GenerateSql, Signal::AttemptFailed, &state_with(Some("e"), 1), &policy),
            Step::GenerateSql
        );
        assert_eq!(
            transition(Step::GenerateSql, Signal::AttemptFailed, &state_with(Some("e"), 2), &policy),
            Step::Failed
        );
    }

    #[test]
    fn test_terminals_are_absorbing() {
        let policy = RetryPolicy::default();
        let state = state_with(Some("e"), 0);
        for terminal in [Step::Succeeded, Step::Failed] {
            assert!(terminal.is_terminal());
            assert_eq!(transition(terminal, Signal::AttemptFailed, &state, &policy), terminal);
        }
        assert_eq!(Step::Failed.terminal(), Some(Terminal::Failed));
        assert_eq!(Step::ExecuteSql.terminal(), None);
    }
}
