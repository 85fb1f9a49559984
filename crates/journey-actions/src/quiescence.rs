//! Adaptive quiescence detection.
//!
//! After a user-level interaction there is no single "done" signal: the
//! page may commit a full navigation, fire a burst of asynchronous
//! requests, or both. [`settle`] races two independent completion signals
//! and resolves on whichever finishes first:
//!
//! 1. a bounded wait for a full page navigation (a generous ceiling; the
//!    timeout is an answer, not an error), and
//! 2. a request-quiescence watch over the session's page-event stream.
//!
//! The detector never raises. Its event subscription is dropped when it
//! returns, so no listener outlives a run.
//!
//! The quiet watch arms one quiet window the moment it starts, so an
//! interaction that triggers neither a navigation nor a request settles
//! after `quiet` instead of hanging until the navigation ceiling. The flip
//! side: work that first reaches the network later than `quiet` after the
//! interaction is not waited for. Pick a `quiet` at least as long as the
//! slowest known delay before a page's first request.

use std::collections::HashMap;
use std::time::Duration;

use journey_core::{PageEvent, RequestId, Session};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Scale applied to the age of the oldest request of a drained burst when
/// computing the documented wait floor. Absorbs bursty sequential request
/// chains without shrinking the observation window.
const BURST_FACTOR: f64 = 1.5;

/// Tunable timing for the settle race. Values are empirical; journeys
/// against slow backends should reach for [`QuiescenceConfig::long`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuiescenceConfig {
    /// Trailing window with no request activity that counts as settled.
    pub quiet: Duration,
    /// Ceiling on the navigation wait. Deliberately ridiculously long so it
    /// dominates slow environments; hitting it just means "no navigation".
    pub nav_timeout: Duration,
}

impl Default for QuiescenceConfig {
    fn default() -> Self {
        Self::medium()
    }
}

impl QuiescenceConfig {
    /// Snappy pages: brief quiet window.
    pub fn short() -> Self {
        Self {
            quiet: Duration::from_millis(50),
            nav_timeout: Duration::from_secs(12),
        }
    }

    /// The everyday default.
    pub fn medium() -> Self {
        Self {
            quiet: Duration::from_millis(200),
            nav_timeout: Duration::from_secs(12),
        }
    }

    /// Pages known to trickle requests for a while after submit.
    pub fn long() -> Self {
        Self {
            quiet: Duration::from_millis(1000),
            nav_timeout: Duration::from_secs(12),
        }
    }

    pub fn with_quiet(mut self, quiet: Duration) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_nav_timeout(mut self, nav_timeout: Duration) -> Self {
        self.nav_timeout = nav_timeout;
        self
    }
}

/// Wait until page work following an interaction has settled.
pub async fn settle(session: &dyn Session, config: &QuiescenceConfig) {
    let events = session.events();
    let quiet = watch_quiet(events, config);
    tokio::pin!(quiet);

    tokio::select! {
        navigated = session.wait_for_navigation(config.nav_timeout) => {
            match navigated {
                Ok(true) => debug!("navigation settled the page"),
                Ok(false) => {
                    debug!(timeout = ?config.nav_timeout, "no navigation; waiting for request quiet");
                    (&mut quiet).await;
                }
                Err(err) => {
                    warn!(error = %err, "navigation wait failed; waiting for request quiet");
                    (&mut quiet).await;
                }
            }
        }
        () = &mut quiet => debug!("request activity went quiet"),
    }
}

/// The request-tracking state machine: an in-flight set, a per-burst
/// low-water start mark, and at most one armed quiet deadline.
///
/// Events may arrive in any order relative to each other and to the timer;
/// each arm below restores the machine's invariant on its own.
async fn watch_quiet(mut events: broadcast::Receiver<PageEvent>, config: &QuiescenceConfig) {
    let mut in_flight: HashMap<RequestId, Instant> = HashMap::new();
    let mut oldest_start: Option<Instant> = None;
    // A page that never issues a request settles after one quiet window.
    let mut deadline: Option<Instant> = Some(Instant::now() + config.quiet);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(PageEvent::RequestStarted { id }) => {
                    // New activity cancels any pending quiet window.
                    deadline = None;
                    let now = Instant::now();
                    in_flight.insert(id, now);
                    oldest_start.get_or_insert(now);
                }
                Ok(PageEvent::RequestFinished { id }) => {
                    if in_flight.remove(&id).is_some() && in_flight.is_empty() {
                        let now = Instant::now();
                        let burst_age = now - oldest_start.take().unwrap_or(now);
                        // The documented floor: 1.5x the age of the oldest
                        // just-finished request, against the quiet window.
                        // The armed window stays the quiet time; the floor
                        // is observational.
                        let floor = burst_age.mul_f64(BURST_FACTOR).max(config.quiet);
                        debug!(
                            ?burst_age,
                            computed_floor = ?floor,
                            quiet = ?config.quiet,
                            "request burst drained; arming quiet window"
                        );
                        deadline = Some(now + config.quiet);
                    }
                }
                Ok(PageEvent::Navigated) => {
                    // A navigation invalidates prior request bookkeeping.
                    debug!("navigation observed; resetting request tracking");
                    in_flight.clear();
                    oldest_start = None;
                    deadline = None;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "page event stream lagged; restarting quiet window");
                    in_flight.clear();
                    oldest_start = None;
                    deadline = Some(Instant::now() + config.quiet);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    // Session is gone; wait out any armed window and settle.
                    if let Some(at) = deadline {
                        tokio::time::sleep_until(at).await;
                    }
                    return;
                }
            },
            () = async { tokio::time::sleep_until(deadline.unwrap()).await },
                if deadline.is_some() => return,
        }
    }
}
