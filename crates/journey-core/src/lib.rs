//! Shared vocabulary for the journeykit step-pipeline engine.
//!
//! This crate defines the types every other layer agrees on:
//! - the [`Session`] capability trait (the injected browser driver seam)
//! - [`State`], the append-only record a run accumulates
//! - [`Options`], the read-only per-run configuration
//! - [`Context`], the bundle threaded through each step
//! - [`Hooks`], the caller-supplied interaction points

pub mod context;
pub mod hooks;
pub mod options;
pub mod session;
pub mod state;

pub use context::Context;
pub use hooks::{DefaultHooks, Hooks};
pub use options::Options;
pub use session::{PageEvent, RequestId, Session, SessionError, UploadFile};
pub use state::{State, StateError};

use std::future::Future;
use std::pin::Pin;

/// Boxed future alias used for object-safe lazy arguments and checks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
