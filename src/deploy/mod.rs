// ABOUTME: Deployment lifecycle orchestration: delete, stop, start and cleanup.
// ABOUTME: Exports the Deployment aggregate, its managers and the stage reporter contract.

mod clock;
mod deployment;
mod disk;
mod error;
mod instance;
mod manager;
mod policy;
mod release;
mod stage;
mod stemcell;
mod wait;

pub use clock::{Clock, SystemClock};
pub use deployment::Deployment;
pub use disk::DiskManager;
pub use error::{DeployError, DeployErrorKind};
pub use instance::{DRAIN_SHUTDOWN, Instance, InstanceManager};
pub use manager::{DeploymentManager, DeploymentStatus, ManagerFactory};
pub use policy::{PingPolicy, UpdatePolicy, WatchTime, WatchTimeError};
pub use stage::{SilentStage, Stage, StageOutcome, Step};
pub use stemcell::StemcellManager;
pub use wait::{wait_for_agent, wait_until_running};
