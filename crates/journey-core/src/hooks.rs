//! Caller-supplied interaction points for one run.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::options::Options;
use crate::state::State;

/// Hooks a caller passes into a run. Lifetime is one run; the flow never
/// owns them.
#[async_trait]
pub trait Hooks: Send + Sync {
    /// Ask the human for a value. `None` means "no answer"; the asking step
    /// will prompt again.
    async fn ask(&self, prompt: &str) -> Option<String>;

    /// Consulted before each step; returning true halts the run with a
    /// partial result instead of an error.
    fn should_stop(&self, state: &State, options: &Options) -> bool;

    fn warning(&self, message: &str);

    fn info(&self, message: &str);
}

/// Defaults for non-interactive runs: never answers, never stops, routes
/// messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

#[async_trait]
impl Hooks for DefaultHooks {
    async fn ask(&self, prompt: &str) -> Option<String> {
        debug!(prompt, "non-interactive hooks have no answer");
        None
    }

    fn should_stop(&self, _state: &State, _options: &Options) -> bool {
        false
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }
}
