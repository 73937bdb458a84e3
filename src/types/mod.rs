// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to keep VM, disk and stemcell identifiers apart.

mod id;
mod instance_name;

pub use id::{DiskCid, DiskId, Id, StemcellCid, StemcellId, VmCid};
pub use instance_name::{InstanceName, JobName, JobNameError};
