//! Error taxonomy for tool invocations.
//!
//! Every per-call failure is local to the invocation that raised it and is
//! reported back to the agent layer as a failed tool result. Only
//! [`AgentError::Configuration`] is fatal: it is raised at startup, before
//! any tool is made available.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Malformed or out-of-enumeration tool arguments. Raised before any
    /// network action is taken.
    #[error("invalid arguments: {0}")]
    Validation(String),

    /// Authentication or reachability failure while opening a device
    /// session. The caller must not assume any command executed.
    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    /// The transport failed while a command was in flight, or the device
    /// error text could not be treated as regular output.
    #[error("remote command failed: {0}")]
    RemoteCommand(String),

    /// Missing or invalid startup configuration (credentials, API key,
    /// device list).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure in the language-model transport.
    #[error("language model error: {0}")]
    Llm(#[from] llm::error::LLMError),

    /// The reasoning loop hit its turn cap without producing an answer.
    #[error("agent stopped after {0} turns without a final answer")]
    AgentLoop(usize),
}

impl AgentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error aborts the process rather than one tool call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = AgentError::validation("family must be ipv4 or ipv6");
        assert_eq!(
            err.to_string(),
            "invalid arguments: family must be ipv4 or ipv6"
        );
    }

    #[test]
    fn test_connection_display_names_host() {
        let err = AgentError::Connection {
            host: "192.0.2.1".to_string(),
            reason: "timed out".to_string(),
        };
        assert!(err.to_string().contains("192.0.2.1"));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(AgentError::configuration("no credentials").is_fatal());
        assert!(!AgentError::validation("bad").is_fatal());
        assert!(!AgentError::RemoteCommand("refused".to_string()).is_fatal());
        assert!(
            !AgentError::Connection {
                host: "h".to_string(),
                reason: "r".to_string()
            }
            .is_fatal()
        );
        assert!(!AgentError::AgentLoop(8).is_fatal());
    }
}
