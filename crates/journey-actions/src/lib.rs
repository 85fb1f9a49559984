//! Action primitives for the journeykit step-pipeline engine.
//!
//! Each primitive is a pure description of one browser interaction. Lazy
//! arguments ([`Resolver`]) are resolved against the execution context
//! inside [`Action::perform`], never at construction time, so the same
//! action value can be rerun against different states.
//!
//! The [`quiescence`] module holds the adaptive settle detector the submit
//! primitive uses in place of a fixed sleep.

pub mod action;
pub mod errors;
pub mod quiescence;
pub mod resolver;
pub mod urls;

mod perform;

#[cfg(test)]
pub(crate) mod testutil;

pub use action::{Action, ActionKind, AssertFn, UrlNormalizer};
pub use errors::ActionError;
pub use quiescence::QuiescenceConfig;
pub use resolver::Resolver;
pub use urls::UrlSet;
