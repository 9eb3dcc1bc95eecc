//! In-process game-events package

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::subsystem::{
    Decision, FeatureSelection, GameEventsApi, GameEventsNotification, Listener, ListenerId, ListenerRegistry,
    SubsystemError, TargetId,
};

/// Scriptable game-events package
///
/// Records every feature request, answers info queries from a table, and raises
/// notifications to whoever is listening.
#[derive(Default)]
pub struct SimGameEvents {
    listeners: ListenerRegistry<GameEventsNotification>,
    failing: Mutex<BTreeSet<TargetId>>,
    info: Mutex<BTreeMap<TargetId, Value>>,
    feature_requests: Mutex<Vec<(TargetId, FeatureSelection)>>,
    info_requests: AtomicUsize,
}

impl SimGameEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make feature requests for this target fail
    pub fn fail_target(&self, target: TargetId) {
        lock(&self.failing).insert(target);
    }

    pub fn set_info(&self, target: TargetId, info: Value) {
        lock(&self.info).insert(target, info);
    }

    /// Every feature request received, in arrival order
    pub fn feature_requests(&self) -> Vec<(TargetId, FeatureSelection)> {
        lock(&self.feature_requests).clone()
    }

    pub fn info_requests(&self) -> usize {
        self.info_requests.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Raise a game-detected notification; returns the capture decision
    pub fn detect(&self, target: TargetId, name: &str, info: Value) -> Decision {
        let capture = Decision::new();
        self.emit(GameEventsNotification::GameDetected {
            target,
            name: name.to_string(),
            info,
            capture: capture.clone(),
        });
        capture
    }

    pub fn info_update(&self, target: TargetId, args: Vec<Value>) {
        self.emit(GameEventsNotification::InfoUpdate { target, args });
    }

    pub fn game_event(&self, target: TargetId, args: Vec<Value>) {
        self.emit(GameEventsNotification::GameEvent { target, args });
    }

    pub fn elevated(&self, target: TargetId) {
        self.emit(GameEventsNotification::ElevatedPrivilegesRequired { target, args: vec![] });
    }

    pub fn error(&self, target: TargetId, error: &str) {
        self.emit(GameEventsNotification::Error {
            target,
            error: error.to_string(),
            args: vec![],
        });
    }

    /// Deliver a notification to every listener; returns how many received it
    pub fn emit(&self, notification: GameEventsNotification) -> usize {
        debug!(kind = notification.kind(), "SimGameEvents::emit: called");
        self.listeners.dispatch(notification)
    }
}

#[async_trait]
impl GameEventsApi for SimGameEvents {
    async fn set_required_features(&self, target: TargetId, features: FeatureSelection) -> Result<(), SubsystemError> {
        debug!(%target, %features, "SimGameEvents::set_required_features: called");
        lock(&self.feature_requests).push((target, features));
        if lock(&self.failing).contains(&target) {
            return Err(SubsystemError::Unsupported(target));
        }
        Ok(())
    }

    async fn get_info(&self, target: TargetId) -> Result<Value, SubsystemError> {
        debug!(%target, "SimGameEvents::get_info: called");
        self.info_requests.fetch_add(1, Ordering::SeqCst);
        lock(&self.info)
            .get(&target)
            .cloned()
            .ok_or(SubsystemError::UnknownTarget(target))
    }

    fn listen(&self) -> Listener<GameEventsNotification> {
        self.listeners.add()
    }

    fn unlisten(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn remove_all_listeners(&self) -> usize {
        self.listeners.clear()
    }
}

pub(super) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
