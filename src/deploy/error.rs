// ABOUTME: Error types for deployment lifecycle operations.
// ABOUTME: Wraps agent, CPI and state failures; all of them abort the current operation.

use std::time::Duration;

use crate::agent::AgentError;
use crate::cloud::CloudError;
use crate::state::StateError;

/// Fatal errors raised while stopping, starting or deleting a deployment.
///
/// Degraded paths (unreachable agent, already-deleted resources) are not
/// errors; they are reported as skipped stages.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    State(#[from] StateError),

    /// The instance never reported `running` inside the watch window.
    #[error("instance '{instance}' was not running after {after:?} (last state: {last_state})")]
    NotRunning {
        instance: String,
        after: Duration,
        last_state: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Agent,
    Cloud,
    State,
    NotRunning,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Agent(_) => DeployErrorKind::Agent,
            DeployError::Cloud(_) => DeployErrorKind::Cloud,
            DeployError::State(_) => DeployErrorKind::State,
            DeployError::NotRunning { .. } => DeployErrorKind::NotRunning,
        }
    }
}
