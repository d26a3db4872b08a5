//! Orchestrator: runs the state machine for one question at a time.
//!
//! The orchestrator holds only shared, read-only collaborators, so one
//! instance serves any number of concurrent runs; each run owns its
//! [`SessionState`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;

use super::machine::{transition, RetryPolicy, Signal, Step, Terminal};
use super::prompt::{sql_prompt, summary_prompt};
use super::state::SessionState;
use crate::error::ServerError;
use crate::llm::{GenerationClient, Profile};
use crate::query::{sanitize_sql, QueryExecutor, QueryOutcome};
use crate::schema::SchemaProvider;

/// Final state of a run plus the path it took.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub state: SessionState,
    pub terminal: Terminal,
    /// Every step visited, in order, ending with the terminal step.
    pub trace: Vec<Step>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.terminal == Terminal::Succeeded
    }

    /// Number of generate → execute cycles the run went through.
    pub fn attempts(&self) -> usize {
        self.trace.iter().filter(|s| **s == Step::GenerateSql).count()
    }
}

pub struct Orchestrator {
    generator: Arc<dyn GenerationClient>,
    schema: Arc<dyn SchemaProvider>,
    executor: Arc<dyn QueryExecutor>,
    policy: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn GenerationClient>,
        schema: Arc<dyn SchemaProvider>,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        Self {
            generator,
            schema,
            executor,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Answer `question`, returning the final report.
    ///
    /// Returns `Err` only for fatal conditions: schema introspection
    /// failure and summary generation failure. Exhausted retries are a
    /// normal `Terminal::Failed` report.
    pub async fn run(
        &self,
        question: impl Into<String>,
        chat_history: Vec<String>,
    ) -> Result<RunReport, ServerError> {
        self.run_state(SessionState::new(question, chat_history)).await
    }

    /// Drive an already-built state from `FetchSchema` to a terminal step.
    pub async fn run_state(&self, mut state: SessionState) -> Result<RunReport, ServerError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("run", run_id = %run_id);

        async move {
            let started_at = Utc::now();
            let max_steps = self.policy.max_steps();
            let mut trace = Vec::with_capacity(max_steps);
            let mut step = Step::FetchSchema;

            tracing::info!("[Workflow] Question: {}", state.question());

            let terminal = loop {
                trace.push(step);
                if let Some(terminal) = step.terminal() {
                    break terminal;
                }
                if trace.len() > max_steps {
                    return Err(ServerError::Internal(format!(
                        "workflow exceeded {} steps without terminating",
                        max_steps
                    )));
                }

                let next = self.step(step, &mut state).await?;
                tracing::debug!(
                    "[Workflow] {} -> {} (retry_count: {})",
                    step,
                    next,
                    state.retry_count
                );
                step = next;
            };

            match terminal {
                Terminal::Succeeded => tracing::info!(
                    "[Workflow] Succeeded after {} attempt(s)",
                    state.retry_count + 1
                ),
                Terminal::Failed => tracing::warn!(
                    "[Workflow] Failed after {} attempt(s): {}",
                    state.retry_count,
                    state.error.as_deref().unwrap_or("unknown")
                ),
            }

            Ok(RunReport {
                run_id,
                state,
                terminal,
                trace,
                started_at,
                finished_at: Utc::now(),
            })
        }
        .instrument(span)
        .await
    }

    /// Run one step's action against `state` and return the next step.
    pub async fn step(&self, step: Step, state: &mut SessionState) -> Result<Step, ServerError> {
        let signal = match step {
            Step::FetchSchema => self.fetch_schema(state).await?,
            Step::GenerateSql => self.generate_sql(state).await,
            Step::ExecuteSql => self.execute_sql(state).await,
            Step::Summarize => self.summarize(state).await?,
            Step::Succeeded | Step::Failed => Signal::Done,
        };
        Ok(transition(step, signal, state, &self.policy))
    }

    async fn fetch_schema(&self, state: &mut SessionState) -> Result<Signal, ServerError> {
        let schema = self.schema.fetch().await.map_err(|e| match e {
            ServerError::Introspection(msg) => ServerError::Introspection(msg),
            other => ServerError::Introspection(other.to_string()),
        })?;
        state.begin_run(schema);
        Ok(Signal::Done)
    }

    async fn generate_sql(&self, state: &mut SessionState) -> Signal {
        let prompt = sql_prompt(state);
        match self.generator.generate(Profile::Coder, &prompt).await {
            Ok(raw) => {
                state.sql_query = sanitize_sql(&raw);
                tracing::debug!("[Workflow] Generated SQL: {}", state.sql_query);
                Signal::Done
            }
            Err(e) => {
                let msg = match e {
                    ServerError::Generation(msg) => msg,
                    other => other.to_string(),
                };
                tracing::warn!("[Workflow] SQL generation failed: {}", msg);
                state.sql_query.clear();
                state.record_failure(format!("generation failed: {}", msg));
                Signal::AttemptFailed
            }
        }
    }

    async fn execute_sql(&self, state: &mut SessionState) -> Signal {
        match self.executor.execute(&state.sql_query).await {
            QueryOutcome::Success(rendered) => state.record_success(rendered),
            QueryOutcome::Failure(diagnostic) => {
                tracing::warn!(
                    "[Workflow] Attempt {} failed: {}",
                    state.retry_count + 1,
                    diagnostic
                );
                state.record_failure(diagnostic);
            }
        }
        Signal::Done
    }

    async fn summarize(&self, state: &mut SessionState) -> Result<Signal, ServerError> {
        let prompt = summary_prompt(state);
        let summary = self.generator.generate(Profile::Explainer, &prompt).await?;
        state.result = summary.trim().to_string();
        Ok(Signal::Done)
    }
}
