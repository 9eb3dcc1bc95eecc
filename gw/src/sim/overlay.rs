//! In-process overlay package

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::game_events::lock;
use crate::subsystem::{
    Decision, GamesFilter, Listener, ListenerId, ListenerRegistry, OverlayApi, OverlayNotification, SubsystemError,
    TargetId, WindowId, WindowOptions,
};

struct SimWindow {
    id: WindowId,
    options: WindowOptions,
    visible: bool,
}

/// Scriptable overlay package
pub struct SimOverlay {
    listeners: ListenerRegistry<OverlayNotification>,
    next_window: AtomicU64,
    windows: Mutex<Vec<SimWindow>>,
    registrations: Mutex<Vec<Vec<TargetId>>>,
}

impl Default for SimOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl SimOverlay {
    pub fn new() -> Self {
        Self {
            listeners: ListenerRegistry::new(),
            next_window: AtomicU64::new(1),
            windows: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Raise a game-launched notification; returns the injection decision
    pub fn launch(&self, info: Value) -> Decision {
        let injection = Decision::new();
        self.emit(OverlayNotification::GameLaunched {
            info,
            injection: injection.clone(),
        });
        injection
    }

    pub fn injected(&self, info: Value) {
        self.emit(OverlayNotification::Injected { info });
    }

    pub fn injection_error(&self, info: Value, error: &str) {
        self.emit(OverlayNotification::InjectionError {
            info,
            error: error.to_string(),
        });
    }

    pub fn focus_changed(&self, game: &str, focus: bool) {
        self.emit(OverlayNotification::FocusChanged {
            window: Value::Null,
            game: game.to_string(),
            focus,
        });
    }

    pub fn window_changed(&self, window: Value, reason: &str) {
        self.emit(OverlayNotification::WindowChanged {
            window,
            game: Value::Null,
            reason: reason.to_string(),
        });
    }

    pub fn exit(&self, info: Value) {
        self.emit(OverlayNotification::GameExit { info });
    }

    pub fn emit(&self, notification: OverlayNotification) -> usize {
        debug!(kind = notification.kind(), "SimOverlay::emit: called");
        self.listeners.dispatch(notification)
    }

    /// Names of windows that have been shown
    pub fn visible_windows(&self) -> Vec<String> {
        lock(&self.windows)
            .iter()
            .filter(|w| w.visible)
            .map(|w| w.options.name.clone())
            .collect()
    }

    /// Game id lists passed to `register_games`, in call order
    pub fn registrations(&self) -> Vec<Vec<TargetId>> {
        lock(&self.registrations).clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl OverlayApi for SimOverlay {
    async fn create_window(&self, options: WindowOptions) -> Result<WindowId, SubsystemError> {
        debug!(name = %options.name, "SimOverlay::create_window: called");
        let id = WindowId(self.next_window.fetch_add(1, Ordering::SeqCst));
        lock(&self.windows).push(SimWindow {
            id,
            options,
            visible: false,
        });
        Ok(id)
    }

    async fn register_games(&self, filter: GamesFilter) -> Result<(), SubsystemError> {
        debug!(games = ?filter.games_ids, "SimOverlay::register_games: called");
        lock(&self.registrations).push(filter.games_ids);
        Ok(())
    }

    fn windows(&self) -> Vec<WindowId> {
        lock(&self.windows).iter().map(|w| w.id).collect()
    }

    async fn show_window(&self, id: WindowId) -> Result<(), SubsystemError> {
        let mut windows = lock(&self.windows);
        let window = windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(SubsystemError::UnknownWindow(id))?;
        window.visible = true;
        Ok(())
    }

    fn listen(&self) -> Listener<OverlayNotification> {
        self.listeners.add()
    }

    fn unlisten(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn remove_all_listeners(&self) -> usize {
        self.listeners.clear()
    }
}
