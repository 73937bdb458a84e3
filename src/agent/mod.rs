// ABOUTME: Capability trait for talking to the agent running inside a VM.
// ABOUTME: The orchestrator only sees this trait; HttpAgentClient is the real transport.

mod error;
mod http;
mod protocol;

pub use error::AgentError;
pub use http::HttpAgentClient;
pub use protocol::{AgentException, AgentRequest, AgentResponse, AgentState, running_task_id};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::DiskCid;

/// RPC surface of the in-guest agent.
///
/// Every call is a single round-trip from the caller's point of view;
/// long-running work is awaited inside the client.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Liveness probe. Any error means "not responsive yet".
    async fn ping(&self) -> Result<String, AgentError>;

    /// Run a lifecycle script (`pre-stop`, `post-start`, ...) on every job.
    async fn run_script(&self, name: &str, params: &Map<String, Value>) -> Result<(), AgentError>;

    async fn drain(&self, reason: &str) -> Result<(), AgentError>;

    async fn stop(&self) -> Result<(), AgentError>;

    async fn start(&self) -> Result<(), AgentError>;

    async fn get_state(&self) -> Result<AgentState, AgentError>;

    /// CIDs of the disks the agent currently has mounted.
    async fn list_disk(&self) -> Result<Vec<DiskCid>, AgentError>;

    async fn unmount_disk(&self, cid: &DiskCid) -> Result<(), AgentError>;
}
