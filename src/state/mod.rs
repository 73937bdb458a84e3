// ABOUTME: Persisted deployment state and the per-kind repositories over it.
// ABOUTME: One JSON document per deployment, rewritten whole after every mutation.

mod error;
mod repo;
mod store;

pub use error::StateError;
pub use repo::{DiskRepo, RecordKind, RecordRepo, StemcellRepo, VmRepo};
pub use store::{FileStateStore, MemoryStateStore, StateStore};

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{DiskCid, DiskId, StemcellCid, StemcellId, VmCid};

/// Root persisted record for one deployment.
///
/// At most one VM, disk and stemcell is current at a time. Historical disk and
/// stemcell records accumulate until they are deleted, which is how unused
/// resources are found during cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    #[serde(default)]
    pub director_id: String,

    #[serde(default)]
    pub installation_id: String,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_vm_cid: Option<VmCid>,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_disk_id: Option<DiskId>,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_stemcell_id: Option<StemcellId>,

    #[serde(default)]
    pub disks: Vec<DiskRecord>,

    #[serde(default)]
    pub stemcells: Vec<StemcellRecord>,
}

impl DeploymentState {
    /// A fresh state with newly generated director and installation ids.
    pub fn generate() -> Self {
        Self {
            director_id: uuid::Uuid::new_v4().to_string(),
            installation_id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        }
    }

    /// True when nothing is current and no historical records remain.
    pub fn is_empty(&self) -> bool {
        self.current_vm_cid.is_none()
            && self.current_disk_id.is_none()
            && self.current_stemcell_id.is_none()
            && self.disks.is_empty()
            && self.stemcells.is_empty()
    }
}

/// A persistent disk created by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskRecord {
    pub id: DiskId,
    pub cid: DiskCid,
    /// Size in MiB.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub cloud_properties: serde_json::Map<String, serde_json::Value>,
}

/// A stemcell uploaded to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemcellRecord {
    pub id: StemcellId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub api_version: u32,
    pub cid: StemcellCid,
}

/// Older state files store "no current resource" as an empty string.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(T::from))
}
