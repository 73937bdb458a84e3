// ABOUTME: Deletion of the current persistent disk and of unused historical disks.
// ABOUTME: Translates repository records into CPI calls with not-found tolerance.

use std::sync::Arc;

use crate::cloud::Cloud;
use crate::state::{DiskRecord, DiskRepo};

use super::release::release;
use super::stage::Stage;
use super::DeployError;

#[derive(Clone)]
pub struct DiskManager {
    cloud: Arc<dyn Cloud>,
    repo: DiskRepo,
}

impl DiskManager {
    pub fn new(cloud: Arc<dyn Cloud>, repo: DiskRepo) -> Self {
        Self { cloud, repo }
    }

    pub fn find_current(&self) -> Result<Option<DiskRecord>, DeployError> {
        Ok(self.repo.find_current()?)
    }

    /// Delete `disk` if it is still the current disk. The record is re-read
    /// first, since earlier steps may have changed the state.
    pub async fn delete(&self, disk: &DiskRecord, stage: &dyn Stage) -> Result<(), DeployError> {
        let Some(current) = self.repo.find_current()?.filter(|c| c.id == disk.id) else {
            tracing::debug!(disk = %disk.cid, "Disk is no longer current, nothing to delete");
            return Ok(());
        };
        release(
            stage,
            &format!("Deleting disk '{}'", current.cid),
            &self.repo,
            &current,
            self.cloud.delete_disk(&current.cid),
        )
        .await
    }

    /// Delete every recorded disk that is not the current one.
    pub async fn delete_unused(&self, stage: &dyn Stage) -> Result<(), DeployError> {
        for disk in self.repo.unused()? {
            release(
                stage,
                &format!("Deleting unused disk '{}'", disk.cid),
                &self.repo,
                &disk,
                self.cloud.delete_disk(&disk.cid),
            )
            .await?;
        }
        Ok(())
    }
}
