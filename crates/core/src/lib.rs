//! Deterministic core of the carwise orchestration engine: the payload model,
//! intent classification, chain construction, per-session trace storage, the
//! capability catalog, the error taxonomy, and configuration loading.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod routing;
pub mod trace;

pub use catalog::{agent_capabilities, AgentCapability};
pub use domain::agent::AgentKind;
pub use domain::intent::{Intent, IntentKind};
pub use domain::payload::{Payload, StepParams};
pub use domain::session::SessionId;
pub use errors::{AgentBuildError, AgentError, DomainError, InterfaceError, OrchestrationError};
pub use routing::{ChainBuilder, ChainStep, IntentClassifier};
pub use trace::{TraceEntry, TraceSink, TraceStore};
