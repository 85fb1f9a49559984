//! Accumulated run state.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Defensive state-access failures. Raised when a step references a key no
/// earlier step produced, so mistakes surface at the step that made them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("state key '{0}' is not set; no earlier step produced it")]
    MissingKey(String),

    #[error("state key '{key}' has unexpected shape: {detail}")]
    WrongShape { key: String, detail: String },
}

/// The open-ended record a journey accumulates as it executes.
///
/// State grows monotonically along a successful run: steps may add or
/// overwrite keys, never remove them. The engine enforces this by unioning
/// replacement states over the previous one rather than swapping them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    entries: BTreeMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// String view of a key, when present and actually a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Deserialize a key into a concrete type, if present.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|err| StateError::WrongShape {
                    key: key.to_string(),
                    detail: err.to_string(),
                }),
        }
    }

    /// Like [`State::get`], but a missing key is an error naming the key.
    pub fn require(&self, key: &str) -> Result<&Value, StateError> {
        self.entries
            .get(key)
            .ok_or_else(|| StateError::MissingKey(key.to_string()))
    }

    /// Like [`State::get_str`], but missing or non-string keys are errors.
    pub fn require_str(&self, key: &str) -> Result<&str, StateError> {
        match self.require(key)? {
            Value::String(s) => Ok(s),
            other => Err(StateError::WrongShape {
                key: key.to_string(),
                detail: format!("expected a string, found {other}"),
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Union of two states; `other`'s values win on key collisions. The
    /// result always carries every key of both inputs.
    pub fn union(mut self, other: State) -> State {
        self.entries.extend(other.entries);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// True when every key of `other` is present here.
    pub fn covers(&self, other: &State) -> bool {
        other.keys().all(|k| self.contains(k))
    }
}

impl FromIterator<(String, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
