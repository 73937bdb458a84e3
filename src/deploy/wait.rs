// ABOUTME: The two bounded polling loops: agent ping gate and running-state watch.
// ABOUTME: Both are deadline-based and take their time source from a Clock.

use crate::agent::AgentClient;
use crate::types::InstanceName;

use super::clock::Clock;
use super::policy::{PingPolicy, UpdatePolicy};
use super::DeployError;

/// Ping until the agent answers or the policy timeout passes. A single ping
/// that hangs is abandoned at the deadline.
///
/// Returns false when the agent never answered; that is a degraded path,
/// not an error.
pub async fn wait_for_agent(agent: &dyn AgentClient, clock: &dyn Clock, policy: PingPolicy) -> bool {
    let deadline = clock.now() + policy.timeout;
    loop {
        let remaining = deadline.saturating_duration_since(clock.now());
        let result = tokio::select! {
            biased;
            result = agent.ping() => result,
            _ = clock.sleep(remaining) => {
                tracing::debug!(timeout = ?policy.timeout, "Ping still pending at deadline");
                return false;
            }
        };
        match result {
            Ok(reply) => {
                tracing::debug!(%reply, "Agent is responsive");
                return true;
            }
            Err(e) if e.is_transport() => tracing::debug!("Agent not responsive yet: {}", e),
            Err(e) => tracing::warn!("Agent answered ping with an error: {}", e),
        }
        if clock.now() >= deadline {
            return false;
        }
        clock.sleep(policy.delay).await;
    }
}

/// Sleep the watch start offset, then poll `get_state` until the job state
/// is running. Errors and other states keep polling until the window closes.
pub async fn wait_until_running(
    agent: &dyn AgentClient,
    clock: &dyn Clock,
    policy: UpdatePolicy,
    instance: &InstanceName,
) -> Result<(), DeployError> {
    if !policy.watch_time.start.is_zero() {
        clock.sleep(policy.watch_time.start).await;
    }

    let deadline = clock.now() + policy.watch_time.window();
    let mut last_state = None;
    loop {
        match agent.get_state().await {
            Ok(state) if state.is_running() => return Ok(()),
            Ok(state) => {
                tracing::debug!(instance = %instance, job_state = %state.job_state, "Instance not running yet");
                last_state = Some(state.job_state);
            }
            Err(e) => tracing::debug!(instance = %instance, "Failed to get agent state: {}", e),
        }
        if clock.now() >= deadline {
            return Err(DeployError::NotRunning {
                instance: instance.to_string(),
                after: policy.watch_time.end,
                last_state: last_state.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        clock.sleep(policy.poll_interval).await;
    }
}
