// ABOUTME: Error types for agent RPC calls.
// ABOUTME: Separates transport failures from exceptions raised by the agent itself.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid agent URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to connect to agent at {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error("agent request '{method}' failed: {reason}")]
    Http { method: String, reason: String },

    #[error("agent responded to '{method}' with status {status}: {body}")]
    Status {
        method: String,
        status: u16,
        body: String,
    },

    #[error("agent request '{method}' timed out after {after:?}")]
    Timeout { method: String, after: Duration },

    /// The agent ran the method and reported a failure.
    #[error("agent responded to '{method}' with error: {message}")]
    Exception { method: String, message: String },

    #[error("invalid agent response to '{method}': {reason}")]
    Protocol { method: String, reason: String },
}

impl AgentError {
    /// Whether the agent answered at all. Exceptions and malformed
    /// answers come from a live agent; everything else is transport.
    pub fn is_transport(&self) -> bool {
        !matches!(
            self,
            AgentError::Exception { .. } | AgentError::Protocol { .. } | AgentError::Status { .. }
        )
    }
}
