//! OverlayHandle - client interface for the overlay coordinator

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::messages::{OverlayRequest, OverlaySnapshot};
use crate::coordinator::CoordinatorError;
use crate::subsystem::{TargetId, WindowId, WindowOptions};

/// Handle for talking to a running OverlayCoordinator
#[derive(Clone)]
pub struct OverlayHandle {
    tx: mpsc::Sender<OverlayRequest>,
}

impl OverlayHandle {
    pub(crate) fn new(tx: mpsc::Sender<OverlayRequest>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> OverlayRequest,
    ) -> Result<T, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| CoordinatorError::ChannelClosed)?;
        reply_rx.await.map_err(|_| CoordinatorError::ChannelClosed)
    }

    /// Games to register with the package after each ready
    pub async fn set_targets(&self, targets: Vec<TargetId>) -> Result<(), CoordinatorError> {
        debug!(?targets, "OverlayHandle::set_targets: called");
        self.request(|reply| OverlayRequest::SetTargets { targets, reply }).await
    }

    pub async fn package_ready(&self, name: &str, version: &str) -> Result<bool, CoordinatorError> {
        debug!(%name, %version, "OverlayHandle::package_ready: called");
        let name = name.to_string();
        let version = version.to_string();
        self.request(|reply| OverlayRequest::PackageReady { name, version, reply })
            .await?
    }

    /// Register games immediately, bypassing the post-ready delay
    pub async fn register_games(&self, targets: Vec<TargetId>) -> Result<(), CoordinatorError> {
        debug!(?targets, "OverlayHandle::register_games: called");
        self.request(|reply| OverlayRequest::RegisterGames { targets, reply })
            .await?
    }

    pub async fn create_window(&self, options: WindowOptions) -> Result<WindowId, CoordinatorError> {
        debug!(name = %options.name, "OverlayHandle::create_window: called");
        self.request(|reply| OverlayRequest::CreateWindow { options, reply })
            .await?
    }

    /// Show every overlay window; returns how many were made visible
    pub async fn show_all_windows(&self) -> Result<usize, CoordinatorError> {
        debug!("OverlayHandle::show_all_windows: called");
        self.request(|reply| OverlayRequest::ShowAllWindows { reply }).await?
    }

    pub async fn snapshot(&self) -> Result<OverlaySnapshot, CoordinatorError> {
        self.request(|reply| OverlayRequest::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        debug!("OverlayHandle::shutdown: called");
        self.tx
            .send(OverlayRequest::Shutdown)
            .await
            .map_err(|_| CoordinatorError::ChannelClosed)
    }
}
