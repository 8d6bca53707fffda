use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_ACTION: &str = "process";
pub const DEFAULT_SUMMARY: &str = "Processing completed";

/// Accumulated result bag threaded through a chain.
///
/// Every agent receives the payload produced by the previous step and returns it
/// merged with its own keys. Well-known keys: `query`, `context`, `action`,
/// `summary`, `criteria`, `cars`, `insights`, `market_summary`,
/// `financing_options`, `financing_recommendation`, `response`, `suggestions`,
/// `next_steps`, `mock`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed payload for a chain: `{query, context}` with the context's own keys
    /// merged on top.
    pub fn seed(query: &str, context: Map<String, Value>) -> Self {
        let mut payload = Self::new()
            .with("query", Value::String(query.to_string()))
            .with("context", Value::Object(context.clone()));
        payload.merge(Self(context));
        payload
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlays `other` onto `self`; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: Payload) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn action(&self) -> &str {
        self.get_str("action").unwrap_or(DEFAULT_ACTION)
    }

    pub fn summary(&self) -> &str {
        self.get_str("summary").unwrap_or(DEFAULT_SUMMARY)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl From<Payload> for Value {
    fn from(value: Payload) -> Self {
        Value::Object(value.0)
    }
}

/// Per-step behaviour switches, e.g. `{"action": "price_check"}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepParams(Map<String, Value>);

impl StepParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn action(action: &str) -> Self {
        Self::new().with("action", Value::String(action.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn requested_action(&self) -> Option<&str> {
        self.get_str("action")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
