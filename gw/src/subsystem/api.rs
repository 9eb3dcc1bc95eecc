//! Package capability traits

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::SubsystemError;
use super::listeners::{Listener, ListenerId};
use super::types::{
    FeatureSelection, GameEventsNotification, GamesFilter, OverlayNotification, TargetId, WindowId, WindowOptions,
};

/// Game-events package: detection, feature-gated info/event streams, errors
#[async_trait]
pub trait GameEventsApi: Send + Sync {
    /// Ask the package to capture the given features for a target
    async fn set_required_features(&self, target: TargetId, features: FeatureSelection) -> Result<(), SubsystemError>;

    /// Current info snapshot for a target (opaque payload)
    async fn get_info(&self, target: TargetId) -> Result<Value, SubsystemError>;

    /// Install a listener for every notification the package raises
    fn listen(&self) -> Listener<GameEventsNotification>;

    /// Remove one listener previously returned by `listen`
    fn unlisten(&self, id: ListenerId) -> bool;

    /// Remove every listener, including other consumers'
    fn remove_all_listeners(&self) -> usize;
}

/// Overlay package: window creation and in-game injection
#[async_trait]
pub trait OverlayApi: Send + Sync {
    async fn create_window(&self, options: WindowOptions) -> Result<WindowId, SubsystemError>;

    /// Tell the package which games to inject into
    async fn register_games(&self, filter: GamesFilter) -> Result<(), SubsystemError>;

    /// All overlay windows currently alive
    fn windows(&self) -> Vec<WindowId>;

    async fn show_window(&self, id: WindowId) -> Result<(), SubsystemError>;

    fn listen(&self) -> Listener<OverlayNotification>;

    fn unlisten(&self, id: ListenerId) -> bool;

    fn remove_all_listeners(&self) -> usize;
}

/// The host process's package manager
///
/// A handle is only available once the host has loaded the package; after a
/// package restart a fresh handle is returned.
pub trait PackageHost: Send + Sync {
    fn game_events(&self) -> Option<Arc<dyn GameEventsApi>>;

    fn overlay(&self) -> Option<Arc<dyn OverlayApi>>;
}
