//! Coordinator for the overlay package
//!
//! Mirrors the game-events coordinator: one task, one listener per package
//! instance, notifications fanned out onto the shared event channels.

mod config;
mod core;
mod handle;
mod messages;
mod router;

pub use config::OverlayConfig;
pub use core::OverlayCoordinator;
pub use handle::OverlayHandle;
pub use messages::{OverlayRequest, OverlaySnapshot};
pub use router::route;
