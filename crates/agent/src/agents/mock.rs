use async_trait::async_trait;
use carwise_core::domain::agent::display_name_for;
use carwise_core::{AgentError, Payload, StepParams};
use serde_json::Value;

use crate::registry::Agent;

/// Stand-in for any kind that could not be constructed; echoes the payload with
/// a `<kind>_processing` action and `mock: true`.
#[derive(Clone, Debug)]
pub struct MockAgent {
    kind: String,
    display_name: String,
}

impl MockAgent {
    pub fn new(kind: &str) -> Self {
        let kind = kind.trim().to_ascii_lowercase();
        let display_name = display_name_for(&kind);
        Self { kind, display_name }
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn process(&self, payload: Payload, _params: &StepParams) -> Result<Payload, AgentError> {
        Ok(payload
            .with("action", Value::String(format!("{}_processing", self.kind)))
            .with("summary", Value::String(format!("{} completed processing", self.display_name)))
            .with("mock", Value::Bool(true)))
    }
}
