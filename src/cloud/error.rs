// ABOUTME: Error types for CPI calls.
// ABOUTME: Classifies provider error types so callers can tell not-found from fatal.

use std::time::Duration;

/// Error returned by a CPI call.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The CPI ran and reported an error.
    #[error("CPI '{method}' method responded with error: {error_type}: {message}")]
    Cpi {
        method: String,
        error_type: String,
        message: String,
        ok_to_retry: bool,
    },

    /// The CPI executable could not be run.
    #[error("failed to execute CPI '{method}': {source}")]
    Execute {
        method: String,
        source: std::io::Error,
    },

    /// The CPI did not answer within the configured timeout.
    #[error("CPI '{method}' timed out after {after:?}")]
    Timeout { method: String, after: Duration },

    /// The CPI answered with something that is not a valid response.
    #[error("invalid CPI '{method}' response: {reason}")]
    Protocol { method: String, reason: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudErrorKind {
    VmNotFound,
    DiskNotFound,
    StemcellNotFound,
    /// Any other provider-reported error.
    Provider,
    /// The CPI could not be reached or answered garbage.
    Transport,
}

impl CloudErrorKind {
    pub const VM_NOT_FOUND: &'static str = "Bosh::Clouds::VMNotFound";
    pub const DISK_NOT_FOUND: &'static str = "Bosh::Clouds::DiskNotFound";
    pub const STEMCELL_NOT_FOUND: &'static str = "Bosh::Clouds::StemcellNotFound";

    /// Classify a provider error type string.
    pub fn from_error_type(error_type: &str) -> Self {
        match error_type {
            Self::VM_NOT_FOUND => CloudErrorKind::VmNotFound,
            Self::DISK_NOT_FOUND => CloudErrorKind::DiskNotFound,
            Self::STEMCELL_NOT_FOUND => CloudErrorKind::StemcellNotFound,
            _ => CloudErrorKind::Provider,
        }
    }
}

impl CloudError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> CloudErrorKind {
        match self {
            CloudError::Cpi { error_type, .. } => CloudErrorKind::from_error_type(error_type),
            CloudError::Execute { .. } | CloudError::Timeout { .. } | CloudError::Protocol { .. } => {
                CloudErrorKind::Transport
            }
        }
    }
}
