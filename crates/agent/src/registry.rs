use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use async_trait::async_trait;
use carwise_core::{AgentBuildError, AgentError, Payload, StepParams};
use tracing::{debug, warn};

use crate::agents::MockAgent;

/// Uniform contract every pipeline stage implements.
///
/// `process` takes ownership of the accumulated payload and must hand back that
/// payload merged with its own keys, never a fresh map; upstream keys that are
/// dropped here are lost for the rest of the chain. Implementations should set
/// `action` and `summary` for the trace and must accept empty `params`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> &str;
    fn display_name(&self) -> &str;
    async fn process(&self, payload: Payload, params: &StepParams) -> Result<Payload, AgentError>;
}

pub trait AgentFactory: Send + Sync {
    fn build(&self, kind: &str) -> Result<Arc<dyn Agent>, AgentBuildError>;
}

type AgentCell = Arc<OnceLock<Arc<dyn Agent>>>;

/// Resolves agent kinds to shared, lazily constructed instances.
///
/// One instance per kind serves every session for the registry's lifetime, so any
/// state an agent keeps is shared across concurrent sessions. Construction of a
/// kind happens at most once even under concurrent first requests; callers racing
/// on the same kind wait for the winner. Construction failures and unknown kinds
/// resolve to a [`MockAgent`], which is cached like any other instance.
pub struct AgentRegistry {
    factory: Arc<dyn AgentFactory>,
    agents: RwLock<HashMap<String, AgentCell>>,
}

impl AgentRegistry {
    pub fn new(factory: Arc<dyn AgentFactory>) -> Self {
        Self { factory, agents: RwLock::new(HashMap::new()) }
    }

    pub fn get(&self, kind: &str) -> Arc<dyn Agent> {
        let key = kind.trim().to_ascii_lowercase();
        let cell = self.cell(&key);
        Arc::clone(cell.get_or_init(|| self.construct(&key)))
    }

    /// Kinds with a constructed instance, sorted.
    pub fn cached_kinds(&self) -> Vec<String> {
        let agents = match self.agents.read() {
            Ok(agents) => agents,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut kinds = agents
            .iter()
            .filter(|(_, cell)| cell.get().is_some())
            .map(|(kind, _)| kind.clone())
            .collect::<Vec<_>>();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.cached_kinds().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: &str) -> AgentCell {
        {
            let agents = match self.agents.read() {
                Ok(agents) => agents,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(cell) = agents.get(key) {
                return Arc::clone(cell);
            }
        }

        let mut agents = match self.agents.write() {
            Ok(agents) => agents,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(agents.entry(key.to_string()).or_default())
    }

    fn construct(&self, kind: &str) -> Arc<dyn Agent> {
        match self.factory.build(kind) {
            Ok(agent) => {
                debug!(
                    event_name = "registry.agent.constructed",
                    agent = kind,
                    display_name = agent.display_name(),
                    "agent constructed"
                );
                agent
            }
            Err(error) => {
                warn!(
                    event_name = "registry.agent.fallback",
                    agent = kind,
                    error = %error,
                    "agent construction failed; substituting mock agent"
                );
                Arc::new(MockAgent::new(kind))
            }
        }
    }
}
