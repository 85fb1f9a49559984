//! Execution context threaded through each step.

use std::fmt;
use std::sync::Arc;

use crate::hooks::Hooks;
use crate::options::Options;
use crate::session::Session;
use crate::state::State;

/// The read-only bundle a step receives at execution time.
///
/// The session and hooks are shared handles owned by the caller; the state
/// is a snapshot current as of this step. A fresh context is produced per
/// step, so holding one across steps never observes later mutations.
#[derive(Clone)]
pub struct Context {
    pub session: Arc<dyn Session>,
    pub options: Arc<Options>,
    pub state: State,
    pub hooks: Arc<dyn Hooks>,
}

impl Context {
    pub fn new(
        session: Arc<dyn Session>,
        options: Arc<Options>,
        state: State,
        hooks: Arc<dyn Hooks>,
    ) -> Self {
        Self {
            session,
            options,
            state,
            hooks,
        }
    }

    /// Same session/options/hooks, different state snapshot.
    pub fn with_state(&self, state: State) -> Self {
        Self {
            session: Arc::clone(&self.session),
            options: Arc::clone(&self.options),
            state,
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
