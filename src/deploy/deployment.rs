// ABOUTME: The deployment aggregate: zero or one instance, disk and stemcell.
// ABOUTME: Composes the managers into delete, stop and start with a fixed ordering.

use crate::state::{DiskRecord, StemcellRecord};

use super::disk::DiskManager;
use super::instance::{Instance, InstanceManager};
use super::policy::UpdatePolicy;
use super::stage::Stage;
use super::stemcell::StemcellManager;
use super::DeployError;

/// Live handles resolved from the repositories.
///
/// `delete` consumes each handle as its resource is released, so calling it
/// again on the same value does nothing. A failed step puts its handle back
/// so a retry resumes from there.
pub struct Deployment {
    instance: Option<Instance>,
    disk: Option<DiskRecord>,
    stemcell: Option<StemcellRecord>,
    instances: InstanceManager,
    disks: DiskManager,
    stemcells: StemcellManager,
}

impl Deployment {
    pub(super) fn new(
        instance: Option<Instance>,
        disk: Option<DiskRecord>,
        stemcell: Option<StemcellRecord>,
        instances: InstanceManager,
        disks: DiskManager,
        stemcells: StemcellManager,
    ) -> Self {
        Self {
            instance,
            disk,
            stemcell,
            instances,
            disks,
            stemcells,
        }
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    pub fn disk(&self) -> Option<&DiskRecord> {
        self.disk.as_ref()
    }

    pub fn stemcell(&self) -> Option<&StemcellRecord> {
        self.stemcell.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_none() && self.disk.is_none() && self.stemcell.is_none()
    }

    /// Delete the instance, then the disk, then the stemcell.
    pub async fn delete(&mut self, skip_drain: bool, stage: &dyn Stage) -> Result<(), DeployError> {
        if let Some(instance) = self.instance.take() {
            if let Err(e) = self.instances.delete(&instance, skip_drain, stage).await {
                self.instance = Some(instance);
                return Err(e);
            }
        }

        if let Some(disk) = self.disk.take() {
            if let Err(e) = self.disks.delete(&disk, stage).await {
                self.disk = Some(disk);
                return Err(e);
            }
        }

        if let Some(stemcell) = self.stemcell.take() {
            if let Err(e) = self.stemcells.delete(&stemcell, stage).await {
                self.stemcell = Some(stemcell);
                return Err(e);
            }
        }

        Ok(())
    }

    /// Stop jobs on the instance. Safe to repeat.
    pub async fn stop(&self, skip_drain: bool, stage: &dyn Stage) -> Result<(), DeployError> {
        match &self.instance {
            Some(instance) => self.instances.stop(instance, skip_drain, stage).await,
            None => Ok(()),
        }
    }

    /// Start jobs on the instance and wait for them to run. Safe to repeat.
    pub async fn start(&self, update: UpdatePolicy, stage: &dyn Stage) -> Result<(), DeployError> {
        match &self.instance {
            Some(instance) => self.instances.start(instance, update, stage).await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployment")
            .field("instance", &self.instance)
            .field("disk", &self.disk)
            .field("stemcell", &self.stemcell)
            .finish_non_exhaustive()
    }
}
