//! Interfaces to the host's game-events and overlay packages
//!
//! The coordinators never talk to a concrete package: they go through the
//! [`GameEventsApi`] and [`OverlayApi`] traits, obtained from a [`PackageHost`]
//! once the host reports the package ready.

mod api;
mod error;
mod listeners;
mod types;

pub use api::{GameEventsApi, OverlayApi, PackageHost};
pub use error::SubsystemError;
pub use listeners::{Listener, ListenerId, ListenerRegistry};
pub use types::{
    Decision, DecisionState, FeatureSelection, GameEventsNotification, GamesFilter, OverlayNotification, TargetId,
    WindowId, WindowOptions,
};
