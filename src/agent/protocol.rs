// ABOUTME: JSON message shapes of the agent RPC protocol.
// ABOUTME: Includes the asynchronous task envelope returned by long-running methods.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AgentError;

#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest<'a> {
    pub method: &'a str,
    pub arguments: Vec<Value>,
    pub reply_to: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub exception: Option<AgentException>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentException {
    #[serde(default)]
    pub message: String,
}

impl AgentResponse {
    /// The returned value, or the agent's exception as an error.
    pub fn into_value(self, method: &str) -> Result<Value, AgentError> {
        match self.exception {
            Some(exception) => Err(AgentError::Exception {
                method: method.to_string(),
                message: exception.message,
            }),
            None => Ok(self.value),
        }
    }
}

/// If `value` is a task envelope still in the `running` state, its task id.
pub fn running_task_id(value: &Value) -> Option<&str> {
    let task = value.as_object()?;
    if task.get("state")?.as_str()? != "running" {
        return None;
    }
    task.get("agent_task_id")?.as_str()
}

/// Snapshot returned by `get_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub job_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
}

impl AgentState {
    pub const RUNNING: &'static str = "running";

    pub fn new(job_state: impl Into<String>) -> Self {
        Self {
            job_state: job_state.into(),
            agent_id: None,
            deployment: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.job_state == Self::RUNNING
    }
}
