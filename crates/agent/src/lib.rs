//! Async runtime for the carwise agent pipeline.
//!
//! A query flows through four stages:
//! 1. **Classification** (`carwise_core::routing`) - keyword rules pick an intent
//! 2. **Chain construction** - the intent maps to an ordered list of agent steps
//! 3. **Execution** (`executor`) - steps run in order over one accumulating payload
//! 4. **Tracing** - each completed step appends an entry to the session's trace
//!
//! # Key Types
//!
//! - `Orchestrator` - public entry point (see `orchestrator` module)
//! - `Agent` / `AgentFactory` - pluggable pipeline stages and their construction
//! - `AgentRegistry` - lazily constructed, shared agent instances with mock fallback
//!
//! Agents are resolved by name at run time. A kind that cannot be built is served
//! by a mock, so a chain only fails when an agent's `process` call fails.

pub mod agents;
pub mod executor;
pub mod logging;
pub mod orchestrator;
pub mod registry;

pub use agents::{BuiltinAgentFactory, MockAgent};
pub use executor::{ChainExecutor, ChainRun};
pub use logging::init_logging;
pub use orchestrator::{OrchestrationOutcome, Orchestrator};
pub use registry::{Agent, AgentFactory, AgentRegistry};
