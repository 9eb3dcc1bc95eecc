//! Coordinator error types

use thiserror::Error;

use crate::subsystem::SubsystemError;

/// Errors surfaced to callers of a coordinator handle
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The host reported the package ready but has no handle for it
    #[error("{0} package is not available from the host")]
    PackageUnavailable(&'static str),

    /// A call that needs a bound package arrived before the package was ready
    #[error("{0} package is not bound yet")]
    NotBound(&'static str),

    #[error("Coordinator channel closed")]
    ChannelClosed,

    #[error("Package call failed: {0}")]
    Subsystem(#[from] SubsystemError),
}

impl CoordinatorError {
    /// Whether the failure stems from calling before the package was ready
    pub fn is_ordering_error(&self) -> bool {
        matches!(self, CoordinatorError::NotBound(_) | CoordinatorError::PackageUnavailable(_))
    }
}
