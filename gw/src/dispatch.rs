//! Delivery of host package notifications to the coordinators

use tracing::{debug, error, info, warn};

use crate::coordinator::CoordinatorHandle;
use crate::overlay::OverlayHandle;

/// Fans host-level package notifications out to both coordinators
///
/// Each coordinator decides for itself whether the package is its own.
#[derive(Clone)]
pub struct PackageDispatcher {
    game_events: CoordinatorHandle,
    overlay: OverlayHandle,
    game_events_package: String,
    overlay_package: String,
}

impl PackageDispatcher {
    pub fn new(
        game_events: CoordinatorHandle,
        overlay: OverlayHandle,
        game_events_package: impl Into<String>,
        overlay_package: impl Into<String>,
    ) -> Self {
        Self {
            game_events,
            overlay,
            game_events_package: game_events_package.into(),
            overlay_package: overlay_package.into(),
        }
    }

    pub fn game_events_package(&self) -> String {
        self.game_events_package.clone()
    }

    pub fn overlay_package(&self) -> String {
        self.overlay_package.clone()
    }

    pub fn game_events(&self) -> &CoordinatorHandle {
        &self.game_events
    }

    pub fn overlay(&self) -> &OverlayHandle {
        &self.overlay
    }

    /// Report a package ready; returns how many coordinators bound to it
    pub async fn package_ready(&self, name: &str, version: &str) -> usize {
        debug!(%name, %version, "PackageDispatcher::package_ready: called");
        let (gep, overlay) = tokio::join!(
            self.game_events.package_ready(name, version),
            self.overlay.package_ready(name, version),
        );

        let mut bound = 0;
        for (coordinator, result) in [("game events", gep), ("overlay", overlay)] {
            match result {
                Ok(true) => bound += 1,
                Ok(false) => {}
                Err(e) if e.is_ordering_error() => {
                    warn!(coordinator, error = %e, "Package ready before the package was available")
                }
                Err(e) => error!(coordinator, error = %e, "Package ready handling failed"),
            }
        }
        info!(%name, bound, "Package ready dispatched");
        bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{Coordinator, CoordinatorConfig};
    use crate::events::EventChannels;
    use crate::overlay::{OverlayConfig, OverlayCoordinator};
    use crate::sim::SimHost;
    use std::sync::Arc;

    fn spawn(host: Arc<SimHost>) -> PackageDispatcher {
        let channels = EventChannels::new(32);
        let gep = Coordinator::new(CoordinatorConfig::default(), host.clone(), &channels);
        let overlay = OverlayCoordinator::new(OverlayConfig::default(), host, &channels);
        let dispatcher = PackageDispatcher::new(gep.handle(), overlay.handle(), "gep", "overlay");
        tokio::spawn(gep.run());
        tokio::spawn(overlay.run());
        dispatcher
    }

    #[tokio::test]
    async fn test_each_package_binds_one_coordinator() {
        let host = Arc::new(SimHost::new());
        host.load_game_events();
        host.load_overlay();
        let dispatcher = spawn(host);

        assert_eq!(dispatcher.package_ready("gep", "1").await, 1);
        assert_eq!(dispatcher.package_ready("overlay", "1").await, 1);
        assert_eq!(dispatcher.package_ready("recorder", "1").await, 0);

        assert!(dispatcher.game_events().snapshot().await.unwrap().bound);
        assert!(dispatcher.overlay().snapshot().await.unwrap().bound);
    }

    #[tokio::test]
    async fn test_missing_package_is_absorbed() {
        let host = Arc::new(SimHost::new());
        let dispatcher = spawn(host);

        assert_eq!(dispatcher.package_ready("gep", "1").await, 0);
    }
}
