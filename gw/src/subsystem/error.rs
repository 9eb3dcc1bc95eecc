//! Subsystem error types

use thiserror::Error;

use super::types::{TargetId, WindowId};

/// Errors reported by a package call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubsystemError {
    #[error("Package is not bound")]
    NotBound,

    #[error("Target {0} does not support the requested features")]
    Unsupported(TargetId),

    #[error("Unknown target {0}")]
    UnknownTarget(TargetId),

    #[error("Unknown window {0}")]
    UnknownWindow(WindowId),
}
