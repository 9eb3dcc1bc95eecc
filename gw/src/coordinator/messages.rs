//! Message types for the Coordinator

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use super::error::CoordinatorError;
use super::negotiator::NegotiationReport;
use crate::subsystem::{FeatureSelection, TargetId};

/// Sentinel text returned to the UI when nothing is under observation
pub const NO_ACTIVE_TARGET: &str = "getInfo error - no active game";

/// Answer to an active-target info query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ActiveInfo {
    /// No target is active; the package was not contacted
    NoActiveTarget,
    /// Payload returned verbatim by the package
    Info(Value),
}

/// Read-only view of the coordinator's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub targets: Vec<TargetId>,
    pub active: Option<TargetId>,
    pub epoch: u64,
    pub bound: bool,
}

/// Internal requests to the Coordinator task
#[derive(Debug)]
pub enum CoordRequest {
    /// Replace the monitored target set
    SetTargets {
        targets: Vec<TargetId>,
        reply: oneshot::Sender<()>,
    },

    /// Host reports a package ready; replies whether this coordinator bound to it
    PackageReady {
        name: String,
        version: String,
        reply: oneshot::Sender<Result<bool, CoordinatorError>>,
    },

    /// Request every feature for every monitored target
    NegotiateAll {
        reply: oneshot::Sender<NegotiationReport>,
    },

    /// Request specific features for one target
    NegotiateFeatures {
        target: TargetId,
        features: FeatureSelection,
        reply: oneshot::Sender<bool>,
    },

    /// Query the package for the active target's info
    ActiveInfo {
        reply: oneshot::Sender<Result<ActiveInfo, CoordinatorError>>,
    },

    /// Get the current state
    Snapshot { reply: oneshot::Sender<SessionSnapshot> },

    /// Shutdown the coordinator
    Shutdown,
}
