// ABOUTME: Deletion of the current stemcell and of unused historical stemcells.
// ABOUTME: Mirrors the disk manager for machine images.

use std::sync::Arc;

use crate::cloud::Cloud;
use crate::state::{StemcellRecord, StemcellRepo};

use super::release::release;
use super::stage::Stage;
use super::DeployError;

#[derive(Clone)]
pub struct StemcellManager {
    cloud: Arc<dyn Cloud>,
    repo: StemcellRepo,
}

impl StemcellManager {
    pub fn new(cloud: Arc<dyn Cloud>, repo: StemcellRepo) -> Self {
        Self { cloud, repo }
    }

    pub fn find_current(&self) -> Result<Option<StemcellRecord>, DeployError> {
        Ok(self.repo.find_current()?)
    }

    /// Delete `stemcell` if it is still current, going by a fresh read.
    pub async fn delete(
        &self,
        stemcell: &StemcellRecord,
        stage: &dyn Stage,
    ) -> Result<(), DeployError> {
        let Some(current) = self
            .repo
            .find_current()?
            .filter(|c| c.id == stemcell.id)
        else {
            tracing::debug!(stemcell = %stemcell.cid, "Stemcell is no longer current, nothing to delete");
            return Ok(());
        };
        release(
            stage,
            &format!("Deleting stemcell '{}'", current.cid),
            &self.repo,
            &current,
            self.cloud.delete_stemcell(&current.cid),
        )
        .await
    }

    pub async fn delete_unused(&self, stage: &dyn Stage) -> Result<(), DeployError> {
        for stemcell in self.repo.unused()? {
            release(
                stage,
                &format!("Deleting unused stemcell '{}'", stemcell.cid),
                &self.repo,
                &stemcell,
                self.cloud.delete_stemcell(&stemcell.cid),
            )
            .await?;
        }
        Ok(())
    }
}
