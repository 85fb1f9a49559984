//! Composable step pipelines for interactive browser journeys.
//!
//! A [`Flow`] is an immutable chain of steps built ahead of time and run
//! later against a concrete context (browser session + options + hooks).
//! Steps act on the page or transform the accumulated [`State`]; branches
//! pick a sub-pipeline from runtime page state; runs can be halted early
//! through the stop hook and come back as a [`RunOutcome::Partial`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use journey_flow::{Flow, FlowError};
//! # use journey_core::{Options, Session, State};
//! # async fn demo(session: Arc<dyn Session>) -> Result<(), FlowError> {
//! let signup = Flow::new()
//!     .navigate_to("/signup")
//!     .generate("username", |_ctx| async move { Ok("qa-user-1".into()) })
//!     .type_text("#username", journey_actions::Resolver::from_state("username"))
//!     .submit()
//!     .expect_url(["/welcome", "/onboarding"]);
//!
//! let state = signup.run(session, State::new(), Options::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod errors;
pub mod flow;
pub mod outcome;
pub mod step;

pub use errors::FlowError;
pub use flow::Flow;
pub use outcome::RunOutcome;
pub use step::Step;

// The vocabulary journeys are written with, re-exported so most authors
// only import from this crate.
pub use journey_actions::{Action, ActionKind, QuiescenceConfig, Resolver, UrlSet};
pub use journey_core::{
    Context, DefaultHooks, Hooks, Options, Session, State, StateError, UploadFile,
};
