//! Step kinds of a flow chain.

use std::fmt;
use std::sync::Arc;

use journey_actions::Action;
use journey_core::{BoxFuture, Context, State};
use serde_json::Value;

use crate::errors::FlowError;
use crate::flow::Flow;

/// Computes one new state value from the current context.
pub type ValueFn =
    Arc<dyn Fn(Context) -> BoxFuture<'static, Result<Value, FlowError>> + Send + Sync>;

/// Inspects the page once and returns a whole replacement state; the
/// engine unions it over the previous state so keys are never lost.
pub type StateFn =
    Arc<dyn Fn(Context) -> BoxFuture<'static, Result<State, FlowError>> + Send + Sync>;

/// Runtime branch condition.
pub type CheckFn =
    Arc<dyn Fn(Context) -> BoxFuture<'static, Result<bool, FlowError>> + Send + Sync>;

/// Cleans up a human-supplied answer before it enters state.
pub type AnswerNormalizer = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Builds a branch arm from a fresh, empty sub-pipeline.
pub type ArmFn = Arc<dyn Fn(Flow) -> Flow + Send + Sync>;

/// One unit of a flow chain: a browser action or a state transform.
#[derive(Clone)]
pub enum Step {
    /// An action primitive; acts on the page, leaves state untouched.
    Act(Action),

    /// Derive one named state value. Overwriting an existing key is
    /// allowed and intentional (e.g. rotating a one-time code).
    Generate { key: String, produce: ValueFn },

    /// Produce several values at once from a single page inspection.
    Evaluate { evaluate: StateFn },

    /// Human-in-the-loop state fill; skipped when the key is pre-seeded.
    AskIfNeeded {
        key: String,
        prompt: String,
        normalize: Option<AnswerNormalizer>,
    },

    /// Conditional sub-pipeline. The two arms may produce different state
    /// shapes; whichever runs, its output is carried forward.
    Branch {
        check: CheckFn,
        if_true: ArmFn,
        if_false: Option<ArmFn>,
    },
}

impl Step {
    /// The step's named kind, for logs and introspection.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Act(action) => match action.kind() {
                journey_actions::ActionKind::Navigate => "navigate",
                journey_actions::ActionKind::Click => "click",
                journey_actions::ActionKind::TypeText => "type",
                journey_actions::ActionKind::Select => "select",
                journey_actions::ActionKind::Submit => "submit",
                journey_actions::ActionKind::Upload => "upload",
                journey_actions::ActionKind::ExpectUrl => "expectUrl",
                journey_actions::ActionKind::Assert => "assert",
            },
            Step::Generate { .. } => "generate",
            Step::Evaluate { .. } => "evaluate",
            Step::AskIfNeeded { .. } => "askIfNeeded",
            Step::Branch { .. } => "branch",
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Step").field(&self.name()).finish()
    }
}
