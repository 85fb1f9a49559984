//! In-memory session fake shared by this crate's tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use journey_core::{
    Context, DefaultHooks, Options, PageEvent, RequestId, Session, SessionError, State, UploadFile,
};
use serde_json::Value;
use tokio::sync::broadcast;
use url::Url;

/// Records every call as a readable op string, replays scripted failures,
/// and lets tests drive the page-event stream by hand.
pub(crate) struct FakeSession {
    ops: Mutex<Vec<String>>,
    url: Mutex<Url>,
    click_failures: Mutex<VecDeque<SessionError>>,
    select_failures: Mutex<VecDeque<SessionError>>,
    script_failures: Mutex<VecDeque<SessionError>>,
    events: broadcast::Sender<PageEvent>,
    navigation_delay: Mutex<Option<Duration>>,
}

impl FakeSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            ops: Mutex::new(Vec::new()),
            url: Mutex::new(Url::parse("https://qa.example.test/").unwrap()),
            click_failures: Mutex::new(VecDeque::new()),
            select_failures: Mutex::new(VecDeque::new()),
            script_failures: Mutex::new(VecDeque::new()),
            events,
            navigation_delay: Mutex::new(None),
        }
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub fn set_url(&self, url: &str) {
        *self.url.lock().unwrap() = Url::parse(url).unwrap();
    }

    pub fn fail_next_click(&self, err: SessionError) {
        self.click_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_select(&self, err: SessionError) {
        self.select_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_script(&self, err: SessionError) {
        self.script_failures.lock().unwrap().push_back(err);
    }

    /// Make `wait_for_navigation` report a navigation after `delay`.
    pub fn navigate_after(&self, delay: Duration) {
        *self.navigation_delay.lock().unwrap() = Some(delay);
    }

    pub fn start_request(&self, id: u64) {
        let _ = self
            .events
            .send(PageEvent::RequestStarted { id: RequestId(id) });
    }

    pub fn finish_request(&self, id: u64) {
        let _ = self
            .events
            .send(PageEvent::RequestFinished { id: RequestId(id) });
    }

    pub fn emit_navigated(&self) {
        let _ = self.events.send(PageEvent::Navigated);
    }

    fn record(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }

    fn next_failure(queue: &Mutex<VecDeque<SessionError>>) -> Option<SessionError> {
        queue.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&self, url: &Url) -> Result<(), SessionError> {
        self.record(format!("navigate {url}"));
        *self.url.lock().unwrap() = url.clone();
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        self.record(format!("click {selector}"));
        match Self::next_failure(&self.click_failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), SessionError> {
        self.record(format!("type {selector} {text}"));
        Ok(())
    }

    async fn select(&self, selector: &str, value: &str) -> Result<(), SessionError> {
        self.record(format!("select {selector} {value}"));
        match Self::next_failure(&self.select_failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn upload(&self, selector: &str, file: &UploadFile) -> Result<(), SessionError> {
        self.record(format!("upload {selector} {}", file.name));
        Ok(())
    }

    async fn evaluate_script(
        &self,
        expression: &str,
        args: &[Value],
    ) -> Result<Value, SessionError> {
        let rendered: Vec<String> = args
            .iter()
            .map(|arg| match arg.as_str() {
                Some(s) => s.to_string(),
                None => arg.to_string(),
            })
            .collect();
        self.record(format!("script {expression} [{}]", rendered.join(", ")));
        match Self::next_failure(&self.script_failures) {
            Some(err) => Err(err),
            None => Ok(Value::Null),
        }
    }

    async fn current_url(&self) -> Result<Url, SessionError> {
        Ok(self.url.lock().unwrap().clone())
    }

    fn events(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<bool, SessionError> {
        let delay = *self.navigation_delay.lock().unwrap();
        match delay {
            Some(delay) if delay <= timeout => {
                tokio::time::sleep(delay).await;
                Ok(true)
            }
            _ => {
                tokio::time::sleep(timeout).await;
                Ok(false)
            }
        }
    }
}

pub(crate) fn context_with(
    session: Arc<FakeSession>,
    options: Options,
    state: State,
) -> Context {
    Context::new(session, Arc::new(options), state, Arc::new(DefaultHooks))
}

pub(crate) fn context_with_state(state: State) -> Context {
    context_with(Arc::new(FakeSession::new()), Options::new(), state)
}
