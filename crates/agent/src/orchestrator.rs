use std::sync::Arc;
use std::time::Instant;

use carwise_core::config::AppConfig;
use carwise_core::{
    agent_capabilities, AgentCapability, ChainBuilder, IntentClassifier, OrchestrationError,
    Payload, SessionId, TraceEntry, TraceSink, TraceStore,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::agents::BuiltinAgentFactory;
use crate::executor::ChainExecutor;
use crate::registry::{AgentFactory, AgentRegistry};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrchestrationOutcome {
    pub session_id: SessionId,
    pub result: Payload,
    pub agent_trace: Vec<TraceEntry>,
}

/// Entry point for a user query: classify, build the chain, execute it, and
/// report the final payload together with the session's trace.
///
/// Safe to share across tasks; concurrent `orchestrate` calls run independent
/// sessions over the same registry and trace store.
pub struct Orchestrator {
    classifier: IntentClassifier,
    chains: ChainBuilder,
    registry: Arc<AgentRegistry>,
    traces: Arc<TraceStore>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinAgentFactory::new()), Arc::new(TraceStore::default()))
    }
}

impl Orchestrator {
    pub fn new(factory: Arc<dyn AgentFactory>, traces: Arc<TraceStore>) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            chains: ChainBuilder::new(),
            registry: Arc::new(AgentRegistry::new(factory)),
            traces,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let factory = BuiltinAgentFactory::with_disabled(config.agents.disabled_kinds());
        Self::new(Arc::new(factory), Arc::new(TraceStore::with_capacity(config.trace.max_sessions)))
    }

    pub async fn orchestrate(
        &self,
        query: &str,
        context: Map<String, Value>,
    ) -> Result<OrchestrationOutcome, OrchestrationError> {
        let session_id = SessionId::generate();
        let started = Instant::now();
        info!(
            event_name = "orchestrator.session.started",
            session_id = %session_id,
            context_keys = context.len(),
            "orchestration session started"
        );

        let intent = self.classifier.classify(query);
        let chain = self.chains.build(&intent);
        info!(
            event_name = "orchestrator.intent.classified",
            session_id = %session_id,
            intent = %intent.kind,
            primary_agent = %intent.primary_agent,
            chain_length = chain.len(),
            "intent classified"
        );

        let executor = ChainExecutor::new(&self.registry, self.traces.as_ref());
        let run = executor.execute(&session_id, &chain, Payload::seed(query, context)).await?;

        info!(
            event_name = "orchestrator.session.completed",
            session_id = %session_id,
            steps = run.trace.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "orchestration session completed"
        );

        Ok(OrchestrationOutcome { session_id, result: run.payload, agent_trace: run.trace })
    }

    /// Entries recorded for a session so far; empty once the store evicts it.
    /// `orchestrate` reports its own entries and does not depend on this.
    pub fn trace(&self, session_id: &SessionId) -> Vec<TraceEntry> {
        self.traces.entries(session_id)
    }

    pub fn agent_capabilities(&self) -> Vec<AgentCapability> {
        agent_capabilities()
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }
}
