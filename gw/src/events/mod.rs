//! Outward event channels
//!
//! Coordinators publish everything they observe here. Consumers (the overlay
//! UI, the log forwarder, tests) subscribe to the channels they care about.
//!
//! # Channels
//!
//! - `log` - free-form message plus ordered arguments, from both coordinators
//! - `target_launch` - a monitored game was detected and capture enabled
//! - `info_update` / `telemetry_event` - game-events package data, per target
//! - `ready` - a package finished loading and was bound
//! - `game_exit` - the overlay package saw a game exit
//! - `injection_decision` - a game launched; the receiver may veto injection

mod bus;
mod logger;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventChannels, EventEmitter, create_event_channels};
pub use logger::{LogForwarder, spawn_log_forwarder};
pub use types::{GameExit, InjectionRequest, LogEntry, PackageReady, Source, TargetLaunch, Telemetry};
