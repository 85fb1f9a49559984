//! Error types for action primitives.

use journey_core::{SessionError, StateError};
use thiserror::Error;

/// Failures an action can surface. Session errors pass through unchanged;
/// the primitives add no retry and no translation beyond the click
/// fallback.
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// An invariant about page location or content did not hold. Always
    /// fatal to the current run; carries both sides for diagnostics.
    #[error("expectation failed: expected {expected}, actual {actual}")]
    ExpectationFailed { expected: String, actual: String },

    /// A navigation or expectation target could not be turned into a URL.
    #[error("bad url '{url}': {detail}")]
    BadUrl { url: String, detail: String },

    /// Raised by the session layer, passed through verbatim.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A resolver referenced state no earlier step produced.
    #[error(transparent)]
    State(#[from] StateError),
}
