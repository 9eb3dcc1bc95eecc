//! Event channels - typed pub/sub fan-out for coordinator output
//!
//! One tokio broadcast channel per notification kind, so consumers subscribe
//! only to what they render and payload shapes are checked at compile time.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::{GameExit, InjectionRequest, LogEntry, PackageReady, Source, TargetLaunch, Telemetry};
use crate::subsystem::{Decision, TargetId};

/// Default per-channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_000;

/// Outward channels shared by both coordinators
///
/// Cloning is cheap; every clone sends on the same channels.
#[derive(Clone)]
pub struct EventChannels {
    log: broadcast::Sender<LogEntry>,
    target_launch: broadcast::Sender<TargetLaunch>,
    info_update: broadcast::Sender<Telemetry>,
    telemetry_event: broadcast::Sender<Telemetry>,
    ready: broadcast::Sender<PackageReady>,
    game_exit: broadcast::Sender<GameExit>,
    injection_decision: broadcast::Sender<InjectionRequest>,
}

impl EventChannels {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventChannels::new: creating channels");
        Self {
            log: broadcast::channel(capacity).0,
            target_launch: broadcast::channel(capacity).0,
            info_update: broadcast::channel(capacity).0,
            telemetry_event: broadcast::channel(capacity).0,
            ready: broadcast::channel(capacity).0,
            game_exit: broadcast::channel(capacity).0,
            injection_decision: broadcast::channel(capacity).0,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn subscribe_log(&self) -> broadcast::Receiver<LogEntry> {
        self.log.subscribe()
    }

    pub fn subscribe_target_launch(&self) -> broadcast::Receiver<TargetLaunch> {
        self.target_launch.subscribe()
    }

    pub fn subscribe_info_update(&self) -> broadcast::Receiver<Telemetry> {
        self.info_update.subscribe()
    }

    pub fn subscribe_telemetry_event(&self) -> broadcast::Receiver<Telemetry> {
        self.telemetry_event.subscribe()
    }

    pub fn subscribe_ready(&self) -> broadcast::Receiver<PackageReady> {
        self.ready.subscribe()
    }

    pub fn subscribe_game_exit(&self) -> broadcast::Receiver<GameExit> {
        self.game_exit.subscribe()
    }

    pub fn subscribe_injection_decision(&self) -> broadcast::Receiver<InjectionRequest> {
        self.injection_decision.subscribe()
    }

    /// Create an emitter that stamps every log entry with `source`
    pub fn emitter_for(&self, source: Source) -> EventEmitter {
        debug!(source = source.as_str(), "EventChannels::emitter_for: creating emitter");
        EventEmitter {
            channels: self.clone(),
            source,
        }
    }
}

impl Default for EventChannels {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Sending side used by a coordinator
///
/// Every send is fire-and-forget: with no subscribers the event is dropped.
#[derive(Clone)]
pub struct EventEmitter {
    channels: EventChannels,
    source: Source,
}

impl EventEmitter {
    pub fn log(&self, message: impl Into<String>, args: Vec<Value>) {
        let entry = LogEntry::new(self.source, message, args);
        debug!(source = self.source.as_str(), message = %entry.message, "EventEmitter::log");
        let _ = self.channels.log.send(entry);
    }

    pub fn target_launch(&self, target: TargetId) {
        debug!(%target, "EventEmitter::target_launch");
        let _ = self.channels.target_launch.send(TargetLaunch { target });
    }

    pub fn info_update(&self, target: TargetId, args: Vec<Value>) {
        let _ = self.channels.info_update.send(Telemetry { target, args });
    }

    pub fn telemetry_event(&self, target: TargetId, args: Vec<Value>) {
        let _ = self.channels.telemetry_event.send(Telemetry { target, args });
    }

    pub fn ready(&self, version: &str) {
        debug!(source = self.source.as_str(), %version, "EventEmitter::ready");
        let _ = self.channels.ready.send(PackageReady {
            source: self.source,
            version: version.to_string(),
        });
    }

    pub fn game_exit(&self, info: Value) {
        let _ = self.channels.game_exit.send(GameExit { info });
    }

    pub fn injection_decision(&self, decision: Decision, info: Value) {
        let _ = self
            .channels
            .injection_decision
            .send(InjectionRequest { decision, info });
    }
}

/// Create channels wrapped in an Arc for shared ownership
pub fn create_event_channels() -> Arc<EventChannels> {
    Arc::new(EventChannels::with_default_capacity())
}
