//! In-process package host

use std::sync::{Arc, Mutex};

use tracing::info;

use super::game_events::{SimGameEvents, lock};
use super::overlay::SimOverlay;
use crate::subsystem::{GameEventsApi, OverlayApi, PackageHost};

/// Package host whose packages can be loaded, restarted and unloaded at will
#[derive(Default)]
pub struct SimHost {
    game_events: Mutex<Option<Arc<SimGameEvents>>>,
    overlay: Mutex<Option<Arc<SimOverlay>>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or restart) the game-events package
    ///
    /// Every call yields a fresh instance with no listeners, the way a real
    /// package restart loses its subscriptions.
    pub fn load_game_events(&self) -> Arc<SimGameEvents> {
        let package = Arc::new(SimGameEvents::new());
        *lock(&self.game_events) = Some(package.clone());
        info!("Simulated game events package loaded");
        package
    }

    pub fn load_overlay(&self) -> Arc<SimOverlay> {
        let package = Arc::new(SimOverlay::new());
        *lock(&self.overlay) = Some(package.clone());
        info!("Simulated overlay package loaded");
        package
    }

    pub fn unload_game_events(&self) {
        lock(&self.game_events).take();
    }

    pub fn unload_overlay(&self) {
        lock(&self.overlay).take();
    }

    /// Currently loaded game-events package, with its simulation controls
    pub fn sim_game_events(&self) -> Option<Arc<SimGameEvents>> {
        lock(&self.game_events).clone()
    }

    pub fn sim_overlay(&self) -> Option<Arc<SimOverlay>> {
        lock(&self.overlay).clone()
    }
}

impl PackageHost for SimHost {
    fn game_events(&self) -> Option<Arc<dyn GameEventsApi>> {
        self.sim_game_events().map(|p| p as Arc<dyn GameEventsApi>)
    }

    fn overlay(&self) -> Option<Arc<dyn OverlayApi>> {
        self.sim_overlay().map(|p| p as Arc<dyn OverlayApi>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_yields_fresh_instance() {
        let host = SimHost::new();
        let first = host.load_game_events();
        let _listener = first.listen();

        let second = host.load_game_events();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.listener_count(), 0);
        assert!(host.game_events().is_some());
    }

    #[test]
    fn test_unload() {
        let host = SimHost::new();
        host.load_overlay();
        host.unload_overlay();
        assert!(host.overlay().is_none());
        assert!(host.game_events().is_none());
    }
}
