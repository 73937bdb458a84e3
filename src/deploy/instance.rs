// ABOUTME: Stop, start and delete sequences for the single instance of a deployment.
// ABOUTME: Guest-side steps run only when the agent answers the ping gate.

use serde_json::Map;
use std::sync::Arc;

use crate::agent::AgentClient;
use crate::cloud::{Cloud, Deletion};
use crate::state::VmRepo;
use crate::types::{InstanceName, VmCid};

use super::clock::Clock;
use super::policy::{PingPolicy, UpdatePolicy};
use super::stage::{Stage, Step};
use super::wait::{wait_for_agent, wait_until_running};
use super::DeployError;

/// Drain reason sent before stopping jobs for deletion or stop.
pub const DRAIN_SHUTDOWN: &str = "shutdown";

/// A live VM plus the agent bound to it.
#[derive(Clone)]
pub struct Instance {
    name: InstanceName,
    vm_cid: VmCid,
    agent: Arc<dyn AgentClient>,
}

impl Instance {
    pub fn new(name: InstanceName, vm_cid: VmCid, agent: Arc<dyn AgentClient>) -> Self {
        Self {
            name,
            vm_cid,
            agent,
        }
    }

    pub fn name(&self) -> &InstanceName {
        &self.name
    }

    pub fn vm_cid(&self) -> &VmCid {
        &self.vm_cid
    }

    pub fn agent(&self) -> &dyn AgentClient {
        self.agent.as_ref()
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("vm_cid", &self.vm_cid)
            .finish_non_exhaustive()
    }
}

/// Drives one instance through its lifecycle.
#[derive(Clone)]
pub struct InstanceManager {
    cloud: Arc<dyn Cloud>,
    agent: Arc<dyn AgentClient>,
    vm_repo: VmRepo,
    name: InstanceName,
    clock: Arc<dyn Clock>,
    ping: PingPolicy,
}

impl InstanceManager {
    pub fn new(
        cloud: Arc<dyn Cloud>,
        agent: Arc<dyn AgentClient>,
        vm_repo: VmRepo,
        name: InstanceName,
        clock: Arc<dyn Clock>,
        ping: PingPolicy,
    ) -> Self {
        Self {
            cloud,
            agent,
            vm_repo,
            name,
            clock,
            ping,
        }
    }

    /// The instance backed by the current VM, if one is recorded.
    pub fn find_current(&self) -> Result<Option<Instance>, DeployError> {
        let instance = self
            .vm_repo
            .find_current()?
            .map(|cid| Instance::new(self.name.clone(), cid, Arc::clone(&self.agent)));
        Ok(instance)
    }

    /// Stop jobs on the instance. An unreachable agent makes this a no-op
    /// after the wait stage.
    pub async fn stop(
        &self,
        instance: &Instance,
        skip_drain: bool,
        stage: &dyn Stage,
    ) -> Result<(), DeployError> {
        if !self.wait_for_agent(instance, stage).await? {
            return Ok(());
        }
        self.stop_jobs(instance, skip_drain, stage).await
    }

    /// Start jobs and wait until the agent reports them running.
    pub async fn start(
        &self,
        instance: &Instance,
        update: UpdatePolicy,
        stage: &dyn Stage,
    ) -> Result<(), DeployError> {
        if !self.wait_for_agent(instance, stage).await? {
            return Ok(());
        }

        let name = instance.name();
        let agent = instance.agent();

        stage
            .perform(&format!("Running the pre-start scripts '{}'", name), async {
                Step::done(agent.run_script("pre-start", &Map::new()).await)
            })
            .await?;

        stage
            .perform(&format!("Starting the agent '{}'", name), async {
                Step::done(agent.start().await)
            })
            .await?;

        stage
            .perform(
                &format!("Waiting for instance '{}' to be running", name),
                async {
                    wait_until_running(agent, self.clock.as_ref(), update, name).await?;
                    Ok(Step::Done)
                },
            )
            .await?;

        stage
            .perform(&format!("Running the post-start scripts '{}'", name), async {
                Step::done(agent.run_script("post-start", &Map::new()).await)
            })
            .await
    }

    /// Stop the instance, unmount its disks and delete its VM.
    ///
    /// A VM the provider no longer knows is deleted without contacting the
    /// agent at all.
    pub async fn delete(
        &self,
        instance: &Instance,
        skip_drain: bool,
        stage: &dyn Stage,
    ) -> Result<(), DeployError> {
        if self.cloud.has_vm(instance.vm_cid()).await? {
            if self.wait_for_agent(instance, stage).await? {
                self.stop_jobs(instance, skip_drain, stage).await?;
                self.unmount_disks(instance, stage).await?;
            }
        } else {
            tracing::warn!(vm = %instance.vm_cid(), "VM not found by the CPI, skipping agent shutdown");
        }
        self.delete_vm(instance, stage).await
    }

    /// The ping gate, reported as its own stage. Returns whether the agent
    /// answered.
    async fn wait_for_agent(&self, instance: &Instance, stage: &dyn Stage) -> Result<bool, DeployError> {
        let mut reachable = false;
        stage
            .perform(
                &format!("Waiting for the agent on VM '{}'", instance.vm_cid()),
                async {
                    reachable = wait_for_agent(instance.agent(), self.clock.as_ref(), self.ping).await;
                    if reachable {
                        Ok(Step::Done)
                    } else {
                        tracing::warn!(
                            vm = %instance.vm_cid(),
                            timeout = ?self.ping.timeout,
                            "Agent unreachable, skipping guest-side steps"
                        );
                        Ok(Step::Skipped(format!(
                            "agent unreachable after {:?}",
                            self.ping.timeout
                        )))
                    }
                },
            )
            .await?;
        Ok(reachable)
    }

    async fn stop_jobs(
        &self,
        instance: &Instance,
        skip_drain: bool,
        stage: &dyn Stage,
    ) -> Result<(), DeployError> {
        let name = instance.name();
        let agent = instance.agent();

        stage
            .perform(&format!("Running the pre-stop scripts '{}'", name), async {
                Step::done(agent.run_script("pre-stop", &Map::new()).await)
            })
            .await?;

        if skip_drain {
            tracing::debug!(instance = %name, "Skipping drain");
        } else {
            stage
                .perform(&format!("Draining jobs on instance '{}'", name), async {
                    Step::done(agent.drain(DRAIN_SHUTDOWN).await)
                })
                .await?;
        }

        stage
            .perform(&format!("Stopping jobs on instance '{}'", name), async {
                Step::done(agent.stop().await)
            })
            .await?;

        stage
            .perform(&format!("Running the post-stop scripts '{}'", name), async {
                Step::done(agent.run_script("post-stop", &Map::new()).await)
            })
            .await
    }

    async fn unmount_disks(&self, instance: &Instance, stage: &dyn Stage) -> Result<(), DeployError> {
        let agent = instance.agent();
        let disks = agent.list_disk().await?;
        for cid in &disks {
            stage
                .perform(&format!("Unmounting disk '{}'", cid), async {
                    Step::done(agent.unmount_disk(cid).await)
                })
                .await?;
        }
        Ok(())
    }

    async fn delete_vm(&self, instance: &Instance, stage: &dyn Stage) -> Result<(), DeployError> {
        let cid = instance.vm_cid();
        stage
            .perform(&format!("Deleting VM '{}'", cid), async {
                let deletion = self.cloud.delete_vm(cid).await?;
                self.vm_repo.clear_current()?;
                Ok(match deletion {
                    Deletion::Deleted => Step::Done,
                    Deletion::NotFound => {
                        tracing::warn!(vm = %cid, "VM already gone");
                        Step::Skipped(format!("VM '{}' not found", cid))
                    }
                })
            })
            .await
    }
}
