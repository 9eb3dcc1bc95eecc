//! Message types for the OverlayCoordinator

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::coordinator::CoordinatorError;
use crate::subsystem::{TargetId, WindowId, WindowOptions};

/// Read-only view of the overlay coordinator's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    pub targets: Vec<TargetId>,
    pub epoch: u64,
    pub bound: bool,
}

/// Internal requests to the OverlayCoordinator task
#[derive(Debug)]
pub enum OverlayRequest {
    /// Games registered with the package after every ready
    SetTargets {
        targets: Vec<TargetId>,
        reply: oneshot::Sender<()>,
    },

    PackageReady {
        name: String,
        version: String,
        reply: oneshot::Sender<Result<bool, CoordinatorError>>,
    },

    /// Register games immediately, without the post-ready delay
    RegisterGames {
        targets: Vec<TargetId>,
        reply: oneshot::Sender<Result<(), CoordinatorError>>,
    },

    CreateWindow {
        options: WindowOptions,
        reply: oneshot::Sender<Result<WindowId, CoordinatorError>>,
    },

    /// Make every overlay window visible; replies with the number shown
    ShowAllWindows {
        reply: oneshot::Sender<Result<usize, CoordinatorError>>,
    },

    Snapshot { reply: oneshot::Sender<OverlaySnapshot> },

    Shutdown,
}
