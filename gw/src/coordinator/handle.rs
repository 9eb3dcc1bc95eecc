//! CoordinatorHandle - client interface for the game-events coordinator

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::error::CoordinatorError;
use super::messages::{ActiveInfo, CoordRequest, SessionSnapshot};
use super::negotiator::NegotiationReport;
use crate::subsystem::{FeatureSelection, TargetId};

/// Handle for talking to a running Coordinator
///
/// This handle is cloneable; every call is a request/reply round trip.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordRequest>,
}

impl CoordinatorHandle {
    pub(crate) fn new(tx: mpsc::Sender<CoordRequest>) -> Self {
        Self { tx }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> CoordRequest) -> Result<T, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| CoordinatorError::ChannelClosed)?;
        reply_rx.await.map_err(|_| CoordinatorError::ChannelClosed)
    }

    /// Replace the monitored target set
    pub async fn set_monitored_targets(&self, targets: Vec<TargetId>) -> Result<(), CoordinatorError> {
        debug!(?targets, "CoordinatorHandle::set_monitored_targets: called");
        self.request(|reply| CoordRequest::SetTargets { targets, reply }).await
    }

    /// Forward a host ready notification
    ///
    /// Returns `Ok(false)` when the package is not ours and an error when it is
    /// ours but the host cannot hand out a package handle.
    pub async fn package_ready(&self, name: &str, version: &str) -> Result<bool, CoordinatorError> {
        debug!(%name, %version, "CoordinatorHandle::package_ready: called");
        let name = name.to_string();
        let version = version.to_string();
        self.request(|reply| CoordRequest::PackageReady { name, version, reply })
            .await?
    }

    /// Request every feature for every monitored target
    ///
    /// Resolves once every per-target request has settled. Per-target failures
    /// are listed in the report, never returned as an error.
    pub async fn negotiate_all_features(&self) -> Result<NegotiationReport, CoordinatorError> {
        debug!("CoordinatorHandle::negotiate_all_features: called");
        self.request(|reply| CoordRequest::NegotiateAll { reply }).await
    }

    /// Request specific features for one target; an empty list asks for none
    ///
    /// A package failure is logged and absorbed: the result is `Ok(false)`.
    pub async fn negotiate_features(&self, target: TargetId, features: Vec<String>) -> Result<bool, CoordinatorError> {
        debug!(%target, ?features, "CoordinatorHandle::negotiate_features: called");
        let features = FeatureSelection::Only(features);
        self.request(|reply| CoordRequest::NegotiateFeatures {
            target,
            features,
            reply,
        })
        .await
    }

    /// Info for the active target, or the no-active-target sentinel
    pub async fn active_target_info(&self) -> Result<ActiveInfo, CoordinatorError> {
        debug!("CoordinatorHandle::active_target_info: called");
        self.request(|reply| CoordRequest::ActiveInfo { reply }).await?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, CoordinatorError> {
        self.request(|reply| CoordRequest::Snapshot { reply }).await
    }

    /// Request shutdown of the Coordinator
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        debug!("CoordinatorHandle::shutdown: called");
        self.tx
            .send(CoordRequest::Shutdown)
            .await
            .map_err(|_| CoordinatorError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_coordinator_reports_channel_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = CoordinatorHandle::new(tx);

        let err = handle.snapshot().await.unwrap_err();
        assert!(matches!(err, CoordinatorError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_dropped_reply_reports_channel_closed() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = CoordinatorHandle::new(tx);

        tokio::spawn(async move {
            // Receive and drop the request without replying
            let _ = rx.recv().await;
        });

        let err = handle.active_target_info().await.unwrap_err();
        assert!(matches!(err, CoordinatorError::ChannelClosed));
    }
}
