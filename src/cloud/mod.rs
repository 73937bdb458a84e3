// ABOUTME: Cloud provider interface (CPI) capability used by the orchestrator.
// ABOUTME: Deletions return an explicit NotFound outcome instead of a sentinel error.

mod cpi;
mod error;
mod protocol;

pub use cpi::ExternalCpi;
pub use error::{CloudError, CloudErrorKind};
pub use protocol::{CmdError, CpiRequest, CpiResponse};

use async_trait::async_trait;

use crate::types::{DiskCid, StemcellCid, VmCid};

/// Outcome of a provider-side delete that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a NotFound deletion should be reported differently from a real one"]
pub enum Deletion {
    /// The provider released the resource.
    Deleted,
    /// The provider reported the resource as already gone.
    NotFound,
}

/// Resource lifecycle calls against a cloud provider.
///
/// Only a `Deletion::NotFound` for the *same* resource kind counts as already
/// deleted; any other provider error comes back as a fatal `CloudError`.
#[async_trait]
pub trait Cloud: Send + Sync {
    /// Whether the provider still knows about the VM.
    async fn has_vm(&self, cid: &VmCid) -> Result<bool, CloudError>;

    async fn delete_vm(&self, cid: &VmCid) -> Result<Deletion, CloudError>;

    async fn delete_disk(&self, cid: &DiskCid) -> Result<Deletion, CloudError>;

    async fn delete_stemcell(&self, cid: &StemcellCid) -> Result<Deletion, CloudError>;
}
