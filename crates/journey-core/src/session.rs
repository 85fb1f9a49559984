//! Browser session capability consumed by the engine.
//!
//! The pipeline never constructs a session; a concrete driver (CDP,
//! WebDriver, an in-memory fake in tests) is injected by the caller and
//! only this contract matters.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

/// Errors reported by the session layer. The engine passes these through
/// unchanged; it performs no translation or retry of its own.
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// No element matched the selector.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Element matched but is not interactable (obscured, disabled).
    #[error("element not clickable: {0}")]
    NotClickable(String),

    /// Dropdown option was not present.
    #[error("option not found: {0}")]
    OptionNotFound(String),

    /// Navigation did not complete in time.
    #[error("navigation timeout: {0}")]
    NavTimeout(String),

    /// In-page script evaluation failed.
    #[error("script error: {0}")]
    Script(String),

    /// Transport or protocol failure.
    #[error("session I/O error: {0}")]
    Io(String),
}

/// Opaque identifier for one network request observed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Page-level events the session broadcasts while a journey runs.
///
/// A request counts as finished whether it succeeded, failed, or was
/// served from cache; the distinction does not matter for quiescence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    RequestStarted { id: RequestId },
    RequestFinished { id: RequestId },
    /// A full page navigation committed.
    Navigated,
}

/// File payload for the upload primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// The browser capability the engine drives.
///
/// One logical step touches the session at a time (steps are strictly
/// sequential), so implementations only need interior synchronization for
/// the event fan-out.
#[async_trait]
pub trait Session: Send + Sync {
    async fn navigate(&self, url: &Url) -> Result<(), SessionError>;

    async fn click(&self, selector: &str) -> Result<(), SessionError>;

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), SessionError>;

    async fn select(&self, selector: &str, value: &str) -> Result<(), SessionError>;

    async fn upload(&self, selector: &str, file: &UploadFile) -> Result<(), SessionError>;

    /// Evaluate a script expression against the page, with JSON arguments,
    /// returning the JSON-coerced result.
    async fn evaluate_script(
        &self,
        expression: &str,
        args: &[Value],
    ) -> Result<Value, SessionError>;

    async fn current_url(&self) -> Result<Url, SessionError>;

    /// Subscribe to page events. Each receiver is an independent listener;
    /// dropping it deregisters the subscription.
    fn events(&self) -> broadcast::Receiver<PageEvent>;

    /// Wait for a full page navigation. Returns `Ok(false)` when the
    /// timeout elapses without one; that is an answer, not an error.
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<bool, SessionError>;
}
