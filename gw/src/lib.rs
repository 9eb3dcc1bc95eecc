//! gamewire - telemetry session coordinator
//!
//! Sits between a host's game-events and overlay packages and the rest of an
//! application. It decides which games to capture, negotiates the features to
//! capture for them, tracks the game currently being played, and republishes
//! everything the packages report on typed event channels.
//!
//! # Core Concepts
//!
//! - **Rebind on ready**: every package ready replaces our one listener; other
//!   consumers' listeners are never touched
//! - **Best-effort negotiation**: one target failing never aborts the batch
//! - **Active target**: set by a monitored detection, cleared by a package error
//!
//! # Modules
//!
//! - [`subsystem`] - package capability traits and notification types
//! - [`coordinator`] - game-events coordinator task and handle
//! - [`overlay`] - overlay coordinator task and handle
//! - [`events`] - outward event channels and the log forwarder
//! - [`dispatch`] - host package notifications to both coordinators
//! - [`ipc`] - Unix socket request channel for UI and CLI processes
//! - [`sim`] - in-process simulated packages and scenario replay
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod events;
pub mod ipc;
pub mod overlay;
pub mod sim;
pub mod subsystem;

// Re-export commonly used types
pub use config::{Config, IpcConfig};
pub use coordinator::{
    ActiveInfo, Coordinator, CoordinatorConfig, CoordinatorError, CoordinatorHandle, NO_ACTIVE_TARGET,
    NegotiationReport, SessionSnapshot,
};
pub use dispatch::PackageDispatcher;
pub use events::{EventChannels, EventEmitter, LogEntry, Source, create_event_channels, spawn_log_forwarder};
pub use overlay::{OverlayConfig, OverlayCoordinator, OverlayHandle};
pub use subsystem::{
    Decision, FeatureSelection, GameEventsApi, GameEventsNotification, OverlayApi, OverlayNotification, PackageHost,
    SubsystemError, TargetId,
};
