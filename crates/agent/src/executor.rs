use std::time::Instant;

use carwise_core::{ChainStep, OrchestrationError, Payload, SessionId, TraceEntry, TraceSink};
use tracing::{debug, error};

use crate::registry::AgentRegistry;

/// Final payload of a completed chain and the entries this run appended, in step
/// order. The entries are kept here as well as in the sink, which may evict the
/// session before the caller reads it back.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainRun {
    pub payload: Payload,
    pub trace: Vec<TraceEntry>,
}

/// Runs a chain strictly in order, feeding each step the previous step's output.
///
/// A trace entry is appended after every successful step, so when step `k` fails
/// the session's trace holds exactly the `k` entries before it. No retries.
pub struct ChainExecutor<'a> {
    registry: &'a AgentRegistry,
    traces: &'a dyn TraceSink,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(registry: &'a AgentRegistry, traces: &'a dyn TraceSink) -> Self {
        Self { registry, traces }
    }

    pub async fn execute(
        &self,
        session_id: &SessionId,
        chain: &[ChainStep],
        seed: Payload,
    ) -> Result<ChainRun, OrchestrationError> {
        let mut payload = seed;
        let mut trace = Vec::with_capacity(chain.len());

        for (step_index, step) in chain.iter().enumerate() {
            let agent = self.registry.get(step.agent.as_str());
            let started = Instant::now();
            debug!(
                event_name = "executor.step.started",
                session_id = %session_id,
                step_index,
                agent = agent.kind(),
                "chain step started"
            );

            payload = match agent.process(payload, &step.params).await {
                Ok(output) => output,
                Err(source) => {
                    error!(
                        event_name = "executor.step.failed",
                        session_id = %session_id,
                        step_index,
                        agent = agent.kind(),
                        error = %source,
                        "chain step failed"
                    );
                    return Err(OrchestrationError::StepFailed {
                        session_id: session_id.clone(),
                        step_index,
                        agent: agent.kind().to_string(),
                        source,
                    });
                }
            };

            let entry = TraceEntry::from_payload(agent.display_name(), &payload);
            debug!(
                event_name = "executor.step.completed",
                session_id = %session_id,
                step_index,
                agent = agent.kind(),
                action = %entry.action,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "chain step completed"
            );
            self.traces.append(session_id, entry.clone());
            trace.push(entry);
        }

        Ok(ChainRun { payload, trace })
    }
}
