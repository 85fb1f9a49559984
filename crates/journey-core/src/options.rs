//! Read-only per-run configuration.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

/// Run-time options supplied once per `run()` invocation.
///
/// Distinct from [`crate::State`]: options are inputs (base URL, feature
/// toggles, per-journey parameters), state is the output accumulator.
#[derive(Debug, Clone, Default)]
pub struct Options {
    base_url: Option<Url>,
    params: BTreeMap<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Base against which relative navigation targets are resolved.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Boolean feature toggle; absent or non-boolean means off.
    pub fn flag(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
