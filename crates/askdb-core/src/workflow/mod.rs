//! Workflow engine: the text-to-SQL state machine.
//!
//! # Architecture
//!
//! ```text
//!  FetchSchema ──► GenerateSql ──► ExecuteSql ──┬──► Summarize ──► Succeeded
//!                      ▲                        │
//!                      └──── retry (< max) ─────┤
//!                                               └──► Failed (retries exhausted)
//! ```
//!
//! Every step reads and writes one [`SessionState`]. The next step is chosen
//! by [`transition`] from the step just run, the [`Signal`] it produced and
//! the [`RetryPolicy`].

pub mod engine;
pub mod machine;
pub mod prompt;
pub mod state;

pub use engine::{Orchestrator, RunReport};
pub use machine::{transition, RetryPolicy, Signal, Step, Terminal, DEFAULT_MAX_ATTEMPTS};
pub use state::SessionState;
