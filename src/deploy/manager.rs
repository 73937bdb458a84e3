// ABOUTME: Resolves the current deployment from state and cleans up unused resources.
// ABOUTME: ManagerFactory wires CPI, agent, state store and timing into the managers.

use serde::Serialize;
use std::sync::Arc;

use crate::agent::AgentClient;
use crate::cloud::Cloud;
use crate::state::{
    DeploymentState, DiskRecord, DiskRepo, StateStore, StemcellRecord, StemcellRepo, VmRepo,
};
use crate::types::{InstanceName, VmCid};

use super::clock::{Clock, SystemClock};
use super::deployment::Deployment;
use super::disk::DiskManager;
use super::instance::InstanceManager;
use super::policy::PingPolicy;
use super::stage::Stage;
use super::stemcell::StemcellManager;
use super::DeployError;

/// Snapshot of what the state file records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentStatus {
    pub director_id: String,
    pub installation_id: String,
    pub vm_cid: Option<VmCid>,
    pub disk: Option<DiskRecord>,
    pub stemcell: Option<StemcellRecord>,
    pub unused_disks: usize,
    pub unused_stemcells: usize,
}

impl DeploymentStatus {
    /// Read the status straight from the state store without creating it.
    /// `None` when no state has been recorded yet. Needs no CPI or agent.
    pub fn load(store: &dyn StateStore) -> Result<Option<Self>, DeployError> {
        Ok(store.read()?.map(Self::from_state))
    }

    fn from_state(state: DeploymentState) -> Self {
        let disk = state
            .current_disk_id
            .as_ref()
            .and_then(|id| state.disks.iter().find(|d| &d.id == id))
            .cloned();
        let stemcell = state
            .current_stemcell_id
            .as_ref()
            .and_then(|id| state.stemcells.iter().find(|s| &s.id == id))
            .cloned();
        let unused_disks = state
            .disks
            .iter()
            .filter(|d| Some(&d.id) != state.current_disk_id.as_ref())
            .count();
        let unused_stemcells = state
            .stemcells
            .iter()
            .filter(|s| Some(&s.id) != state.current_stemcell_id.as_ref())
            .count();

        DeploymentStatus {
            director_id: state.director_id,
            installation_id: state.installation_id,
            vm_cid: state.current_vm_cid,
            disk,
            stemcell,
            unused_disks,
            unused_stemcells,
        }
    }
}

pub struct DeploymentManager {
    store: Arc<dyn StateStore>,
    instances: InstanceManager,
    disks: DiskManager,
    stemcells: StemcellManager,
}

impl DeploymentManager {
    /// The deployment recorded in state, or `None` when nothing is current.
    pub fn find_current(&self) -> Result<Option<Deployment>, DeployError> {
        let instance = self.instances.find_current()?;
        let disk = self.disks.find_current()?;
        let stemcell = self.stemcells.find_current()?;

        if instance.is_none() && disk.is_none() && stemcell.is_none() {
            tracing::debug!("No current deployment recorded");
            return Ok(None);
        }

        Ok(Some(Deployment::new(
            instance,
            disk,
            stemcell,
            self.instances.clone(),
            self.disks.clone(),
            self.stemcells.clone(),
        )))
    }

    /// Delete disks and stemcells that are recorded but not current.
    pub async fn cleanup(&self, stage: &dyn Stage) -> Result<(), DeployError> {
        self.disks.delete_unused(stage).await?;
        self.stemcells.delete_unused(stage).await
    }

    pub fn status(&self) -> Result<Option<DeploymentStatus>, DeployError> {
        DeploymentStatus::load(self.store.as_ref())
    }
}

/// Builds managers that share one CPI, agent and state store.
pub struct ManagerFactory {
    cloud: Arc<dyn Cloud>,
    agent: Arc<dyn AgentClient>,
    store: Arc<dyn StateStore>,
    instance_name: InstanceName,
    ping: PingPolicy,
    clock: Arc<dyn Clock>,
}

impl ManagerFactory {
    pub fn new(
        cloud: Arc<dyn Cloud>,
        agent: Arc<dyn AgentClient>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            cloud,
            agent,
            store,
            instance_name: InstanceName::default(),
            ping: PingPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn instance_name(mut self, name: InstanceName) -> Self {
        self.instance_name = name;
        self
    }

    pub fn ping_policy(mut self, ping: PingPolicy) -> Self {
        self.ping = ping;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn instance_manager(&self) -> InstanceManager {
        InstanceManager::new(
            Arc::clone(&self.cloud),
            Arc::clone(&self.agent),
            VmRepo::new(Arc::clone(&self.store)),
            self.instance_name.clone(),
            Arc::clone(&self.clock),
            self.ping,
        )
    }

    pub fn disk_manager(&self) -> DiskManager {
        DiskManager::new(Arc::clone(&self.cloud), DiskRepo::new(Arc::clone(&self.store)))
    }

    pub fn stemcell_manager(&self) -> StemcellManager {
        StemcellManager::new(
            Arc::clone(&self.cloud),
            StemcellRepo::new(Arc::clone(&self.store)),
        )
    }

    pub fn deployment_manager(&self) -> DeploymentManager {
        DeploymentManager {
            store: Arc::clone(&self.store),
            instances: self.instance_manager(),
            disks: self.disk_manager(),
            stemcells: self.stemcell_manager(),
        }
    }
}
