//! Run results.

use journey_core::State;

/// How a run ended. Stop-by-request is a checked short-circuit, not an
/// error: callers must be able to tell "user asked to stop here" from
/// "a step failed".
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The chain ran to its end; carries the full output state.
    Completed(State),

    /// A stop condition fired first; carries whatever prefix of state was
    /// built. Nothing is persisted: a fresh run starts from step one.
    Partial(State),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn state(&self) -> &State {
        match self {
            RunOutcome::Completed(state) | RunOutcome::Partial(state) => state,
        }
    }

    pub fn into_state(self) -> State {
        match self {
            RunOutcome::Completed(state) | RunOutcome::Partial(state) => state,
        }
    }
}
