use thiserror::Error;

use crate::domain::session::SessionId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown agent kind `{0}`")]
    UnknownAgentKind(String),
}

/// Failure reported by an agent's `process` call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

/// Failure to construct an agent. The registry recovers from every variant by
/// substituting the mock agent.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentBuildError {
    #[error("no implementation is available for agent `{kind}`")]
    Unavailable { kind: String },
    #[error("agent `{kind}` is disabled by configuration")]
    Disabled { kind: String },
    #[error("agent `{kind}` is misconfigured: {message}")]
    Misconfigured { kind: String, message: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error("step {step_index} ({agent}) failed in {session_id}: {source}")]
    StepFailed {
        session_id: SessionId,
        step_index: usize,
        agent: String,
        #[source]
        source: AgentError,
    },
}

impl OrchestrationError {
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::StepFailed { session_id, .. } => session_id,
        }
    }

    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl From<OrchestrationError> for InterfaceError {
    fn from(value: OrchestrationError) -> Self {
        let message = value.to_string();
        let correlation_id = value.session_id().to_string();
        match value {
            OrchestrationError::StepFailed { source: AgentError::InvalidInput(_), .. } => {
                Self::BadRequest { message, correlation_id }
            }
            OrchestrationError::StepFailed { source: AgentError::Integration(_), .. } => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            OrchestrationError::StepFailed { source: AgentError::Internal(_), .. } => {
                Self::Internal { message, correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::session::SessionId;
    use crate::errors::{AgentError, InterfaceError, OrchestrationError};

    fn step_failure(source: AgentError) -> OrchestrationError {
        OrchestrationError::StepFailed {
            session_id: SessionId("session_1_abc".to_owned()),
            step_index: 1,
            agent: "rag".to_owned(),
            source,
        }
    }

    #[test]
    fn step_failure_names_step_and_agent() {
        let message = step_failure(AgentError::Internal("boom".to_owned())).to_string();
        assert!(message.contains("step 1"));
        assert!(message.contains("(rag)"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let failure = step_failure(AgentError::InvalidInput("car has no price".to_owned()));
        let interface = failure.into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn integration_failure_maps_to_service_unavailable() {
        let interface = step_failure(AgentError::Integration("lender api timeout".to_owned()))
            .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn default_correlation_is_the_session_id() {
        let interface = InterfaceError::from(step_failure(AgentError::Internal("x".to_owned())));
        assert!(matches!(
            interface,
            InterfaceError::Internal { ref correlation_id, .. } if correlation_id == "session_1_abc"
        ));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
