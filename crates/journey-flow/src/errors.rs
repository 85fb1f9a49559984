//! Error types for flow execution.

use journey_actions::ActionError;
use journey_core::{SessionError, StateError};
use thiserror::Error;

/// A step's failure, surfaced to the `run()` caller verbatim. The pipeline
/// performs no retries and no translation; composition (branch, `then`)
/// never swallows inner errors.
#[derive(Debug, Error, Clone)]
pub enum FlowError {
    /// An action primitive failed (including expectation failures).
    #[error(transparent)]
    Action(#[from] ActionError),

    /// A step referenced state no earlier step produced.
    #[error(transparent)]
    State(#[from] StateError),

    /// A user-supplied generate/evaluate/check function failed.
    #[error("step failed: {0}")]
    Step(String),
}

impl From<SessionError> for FlowError {
    fn from(err: SessionError) -> Self {
        FlowError::Action(ActionError::Session(err))
    }
}
