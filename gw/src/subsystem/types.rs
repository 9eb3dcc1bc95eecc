//! Vocabulary shared with the game-events and overlay packages

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a game as assigned by the game-events package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TargetId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Features requested from the package for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureSelection {
    /// Wildcard: every feature the target supports
    #[default]
    All,
    /// An explicit list of feature names
    Only(Vec<String>),
}

impl FeatureSelection {
    pub fn only<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(features.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FeatureSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Only(features) => write!(f, "[{}]", features.join(",")),
        }
    }
}

const PENDING: u8 = 0;
const ACCEPTED: u8 = 1;
const DECLINED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionState {
    Pending,
    Accepted,
    Declined,
}

/// Answer a listener hands back to the package for a notification
///
/// Game-detected notifications carry one for "start capturing this game",
/// game-launched notifications carry one for "inject the overlay". Clones share
/// the same answer; the last call wins.
#[derive(Debug, Clone)]
pub struct Decision {
    state: Arc<AtomicU8>,
}

impl Default for Decision {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }
}

impl Decision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&self) {
        self.state.store(ACCEPTED, Ordering::SeqCst);
    }

    pub fn decline(&self) {
        self.state.store(DECLINED, Ordering::SeqCst);
    }

    pub fn state(&self) -> DecisionState {
        match self.state.load(Ordering::SeqCst) {
            PENDING => DecisionState::Pending,
            ACCEPTED => DecisionState::Accepted,
            DECLINED => DecisionState::Declined,
            // Only the three states above are ever stored
            _ => DecisionState::Pending,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.state() == DecisionState::Accepted
    }
}

/// Notifications raised by the game-events package
#[derive(Debug, Clone)]
pub enum GameEventsNotification {
    /// A game process was found; `capture` enables event capture for it
    GameDetected {
        target: TargetId,
        name: String,
        info: Value,
        capture: Decision,
    },
    /// The game runs elevated; fires after `GameDetected`
    ElevatedPrivilegesRequired { target: TargetId, args: Vec<Value> },
    InfoUpdate { target: TargetId, args: Vec<Value> },
    GameEvent { target: TargetId, args: Vec<Value> },
    Error {
        target: TargetId,
        error: String,
        args: Vec<Value>,
    },
}

impl GameEventsNotification {
    pub fn target(&self) -> TargetId {
        match self {
            Self::GameDetected { target, .. }
            | Self::ElevatedPrivilegesRequired { target, .. }
            | Self::InfoUpdate { target, .. }
            | Self::GameEvent { target, .. }
            | Self::Error { target, .. } => *target,
        }
    }

    /// Package-side event name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameDetected { .. } => "game-detected",
            Self::ElevatedPrivilegesRequired { .. } => "elevated-privileges-required",
            Self::InfoUpdate { .. } => "new-info-update",
            Self::GameEvent { .. } => "new-game-event",
            Self::Error { .. } => "error",
        }
    }
}

/// Notifications raised by the overlay package
#[derive(Debug, Clone)]
pub enum OverlayNotification {
    /// A registered game started; `injection` decides whether the overlay is injected
    GameLaunched { info: Value, injection: Decision },
    InjectionError { info: Value, error: String },
    Injected { info: Value },
    FocusChanged { window: Value, game: String, focus: bool },
    WindowChanged { window: Value, game: Value, reason: String },
    InputInterceptionChanged { info: Value },
    InputExclusiveModeChanged { info: Value },
    GameExit { info: Value },
}

impl OverlayNotification {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameLaunched { .. } => "game-launched",
            Self::InjectionError { .. } => "game-injection-error",
            Self::Injected { .. } => "game-injected",
            Self::FocusChanged { .. } => "game-focus-changed",
            Self::WindowChanged { .. } => "game-window-changed",
            Self::InputInterceptionChanged { .. } => "game-input-interception-changed",
            Self::InputExclusiveModeChanged { .. } => "game-input-exclusive-mode-changed",
            Self::GameExit { .. } => "game-exit",
        }
    }
}

/// Options for an off-screen overlay window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub url: Option<String>,
    /// Let mouse input pass through to the game
    pub passthrough: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            name: "overlay".to_string(),
            width: 400,
            height: 300,
            url: None,
            passthrough: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Games the overlay package should inject into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesFilter {
    #[serde(rename = "games-ids")]
    pub games_ids: Vec<TargetId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_starts_pending() {
        let decision = Decision::new();
        assert_eq!(decision.state(), DecisionState::Pending);
        assert!(!decision.is_accepted());
        assert_eq!(Decision::default().state(), DecisionState::Pending);
    }

    #[test]
    fn test_decision_last_answer_wins() {
        let decision = Decision::new();
        decision.decline();
        assert_eq!(decision.state(), DecisionState::Declined);

        decision.accept();
        assert_eq!(decision.state(), DecisionState::Accepted);
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_decision_clones_share_answer() {
        let decision = Decision::new();
        let listener_copy = decision.clone();

        listener_copy.accept();
        assert!(decision.is_accepted());

        decision.decline();
        assert_eq!(listener_copy.state(), DecisionState::Declined);
    }

    #[test]
    fn test_feature_selection_display() {
        assert_eq!(FeatureSelection::All.to_string(), "*");

        let only = FeatureSelection::only(["kill", "death"]);
        assert_eq!(only, FeatureSelection::Only(vec!["kill".to_string(), "death".to_string()]));
        assert_eq!(only.to_string(), "[kill,death]");
    }

    #[test]
    fn test_notification_target_and_kind() {
        let n = GameEventsNotification::Error {
            target: TargetId(21640),
            error: "crashed".to_string(),
            args: vec![],
        };
        assert_eq!(n.target(), TargetId(21640));
        assert_eq!(n.kind(), "error");
    }

    #[test]
    fn test_target_id_is_transparent() {
        let ids: Vec<TargetId> = serde_json::from_str("[5, 7, 11]").unwrap();
        assert_eq!(ids, vec![TargetId(5), TargetId(7), TargetId(11)]);
        assert_eq!(serde_json::to_string(&TargetId(5)).unwrap(), "5");
    }

    #[test]
    fn test_games_filter_serialization() {
        let filter = GamesFilter {
            games_ids: vec![TargetId(1)],
        };
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"{"games-ids":[1]}"#);
    }
}
