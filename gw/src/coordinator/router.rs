//! Event routing for the game-events package
//!
//! A [`Binding`] is the coordinator's single listener on the current package
//! instance. Rebinding drops the previous listener by id, so notifications from
//! an old binding can never reach the router and co-tenants keep theirs.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::state::SessionState;
use crate::events::EventEmitter;
use crate::subsystem::{GameEventsNotification, Listener, ListenerId};

/// One installed listener and the epoch it was installed in
#[derive(Debug)]
pub struct Binding<N> {
    epoch: u64,
    listener: Listener<N>,
}

impl<N> Binding<N> {
    pub fn new(epoch: u64, listener: Listener<N>) -> Self {
        debug!(epoch, listener = %listener.id(), "Binding::new: called");
        Self { epoch, listener }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener.id()
    }
}

/// Next notification from the current binding
///
/// Pends forever while unbound. Resolves to None when the package dropped the
/// listener, after which the caller should discard the binding.
pub async fn next_notification<N>(binding: &mut Option<Binding<N>>) -> Option<N> {
    match binding {
        Some(binding) => binding.listener.recv().await,
        None => std::future::pending().await,
    }
}

/// Apply one game-events notification to the session and fan it out
pub fn route(state: &mut SessionState, notification: GameEventsNotification, emitter: &EventEmitter) {
    debug!(kind = notification.kind(), target = %notification.target(), "route: called");

    match notification {
        GameEventsNotification::GameDetected {
            target,
            name,
            info,
            capture,
        } => {
            if !state.is_monitored(target) {
                debug!(%target, %name, "route: skipping unmonitored game");
                let pid = info.get("pid").cloned().unwrap_or(Value::Null);
                emitter.log("gep: skip game-detected", vec![json!(target), json!(name), pid]);
                return;
            }

            emitter.log("gep: register game-detected", vec![json!(target), json!(name), info]);
            emitter.target_launch(target);
            capture.accept();
            state.activate(target);
            info!(%target, %name, "route: target active");
        }

        GameEventsNotification::ElevatedPrivilegesRequired { target, args } => {
            warn!(%target, "route: game requires elevated privileges");
            emitter.log("elevated-privileges-required", with_target(target.0, args));
        }

        GameEventsNotification::InfoUpdate { target, args } => {
            emitter.log("new-info", with_target(target.0, args.clone()));
            emitter.info_update(target, args);
        }

        GameEventsNotification::GameEvent { target, args } => {
            emitter.log("new-event", with_target(target.0, args.clone()));
            emitter.telemetry_event(target, args);
        }

        GameEventsNotification::Error { target, error, args } => {
            let ended = state.clear_active();
            warn!(%target, %error, ?ended, "route: package error, session ended");
            let mut logged = vec![json!(target), json!(error)];
            logged.extend(args);
            emitter.log("gep-error", logged);
        }
    }
}

fn with_target(target: u32, args: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(args.len() + 1);
    out.push(json!(target));
    out.extend(args);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventChannels, Source};
    use crate::subsystem::{Decision, ListenerRegistry, TargetId};
    use proptest::prelude::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn detected(target: u32) -> (GameEventsNotification, Decision) {
        let capture = Decision::new();
        let n = GameEventsNotification::GameDetected {
            target: TargetId(target),
            name: "VALORANT".to_string(),
            info: json!({"pid": 4242}),
            capture: capture.clone(),
        };
        (n, capture)
    }

    fn monitored(raw: &[u32]) -> SessionState {
        let mut state = SessionState::new();
        state.set_targets(raw.iter().copied().map(TargetId).collect());
        state
    }

    #[test]
    fn test_detect_monitored_target() {
        let channels = EventChannels::new(16);
        let mut launches = channels.subscribe_target_launch();
        let mut log = channels.subscribe_log();
        let mut state = monitored(&[21640]);

        let (n, capture) = detected(21640);
        route(&mut state, n, &channels.emitter_for(Source::GameEvents));

        assert_eq!(state.active(), Some(TargetId(21640)));
        assert!(capture.is_accepted());
        assert_eq!(launches.try_recv().unwrap().target, TargetId(21640));
        assert!(matches!(launches.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(log.try_recv().unwrap().message, "gep: register game-detected");
    }

    #[test]
    fn test_detect_unmonitored_target_is_skipped() {
        let channels = EventChannels::new(16);
        let mut launches = channels.subscribe_target_launch();
        let mut log = channels.subscribe_log();
        let mut state = monitored(&[1]);

        let (n, capture) = detected(2);
        route(&mut state, n, &channels.emitter_for(Source::GameEvents));

        assert_eq!(state.active(), None);
        assert!(!capture.is_accepted());
        assert!(matches!(launches.try_recv(), Err(TryRecvError::Empty)));
        let entry = log.try_recv().unwrap();
        assert_eq!(entry.message, "gep: skip game-detected");
        assert_eq!(entry.args, vec![json!(2), json!("VALORANT"), json!(4242)]);
    }

    #[test]
    fn test_info_update_and_game_event_channels() {
        let channels = EventChannels::new(16);
        let mut infos = channels.subscribe_info_update();
        let mut events = channels.subscribe_telemetry_event();
        let mut state = monitored(&[1]);
        let emitter = channels.emitter_for(Source::GameEvents);

        route(
            &mut state,
            GameEventsNotification::InfoUpdate {
                target: TargetId(1),
                args: vec![json!({"match_info": {"round": 3}})],
            },
            &emitter,
        );
        route(
            &mut state,
            GameEventsNotification::GameEvent {
                target: TargetId(1),
                args: vec![json!({"name": "kill"})],
            },
            &emitter,
        );

        let info = infos.try_recv().unwrap();
        assert_eq!(info.target, TargetId(1));
        assert_eq!(info.args, vec![json!({"match_info": {"round": 3}})]);
        assert_eq!(events.try_recv().unwrap().args, vec![json!({"name": "kill"})]);
    }

    #[test]
    fn test_elevated_privileges_only_logs() {
        let channels = EventChannels::new(16);
        let mut launches = channels.subscribe_target_launch();
        let mut log = channels.subscribe_log();
        let mut state = monitored(&[1]);

        route(
            &mut state,
            GameEventsNotification::ElevatedPrivilegesRequired {
                target: TargetId(1),
                args: vec![],
            },
            &channels.emitter_for(Source::GameEvents),
        );

        assert_eq!(state.active(), None);
        assert!(matches!(launches.try_recv(), Err(TryRecvError::Empty)));
        let entry = log.try_recv().unwrap();
        assert_eq!(entry.message, "elevated-privileges-required");
        assert_eq!(entry.args, vec![json!(1)]);
    }

    #[test]
    fn test_error_clears_active_target() {
        let channels = EventChannels::new(16);
        let mut log = channels.subscribe_log();
        let mut state = monitored(&[1]);
        state.activate(TargetId(1));

        route(
            &mut state,
            GameEventsNotification::Error {
                target: TargetId(99),
                error: "process lost".to_string(),
                args: vec![json!("extra")],
            },
            &channels.emitter_for(Source::GameEvents),
        );

        assert_eq!(state.active(), None);
        let entry = log.try_recv().unwrap();
        assert_eq!(entry.message, "gep-error");
        assert_eq!(entry.args, vec![json!(99), json!("process lost"), json!("extra")]);
    }

    #[tokio::test]
    async fn test_next_notification_reads_binding() {
        let registry = ListenerRegistry::new();
        let mut binding = Some(Binding::new(1, registry.add()));
        registry.dispatch(5u8);
        assert_eq!(next_notification(&mut binding).await, Some(5));

        registry.clear();
        assert_eq!(next_notification(&mut binding).await, None);
    }

    #[tokio::test]
    async fn test_next_notification_pends_when_unbound() {
        let mut binding: Option<Binding<u8>> = None;
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(20), next_notification(&mut binding)).await;
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_detection_outside_set_never_launches(
            targets in proptest::collection::vec(0u32..20, 0..6),
            candidate in 20u32..40,
        ) {
            let channels = EventChannels::new(16);
            let mut launches = channels.subscribe_target_launch();
            let mut state = monitored(&targets);

            let (n, capture) = detected(candidate);
            route(&mut state, n, &channels.emitter_for(Source::GameEvents));

            prop_assert_eq!(state.active(), None);
            prop_assert!(!capture.is_accepted());
            prop_assert!(launches.try_recv().is_err());
        }

        #[test]
        fn prop_detection_inside_set_launches_once(
            targets in proptest::collection::vec(0u32..20, 1..6),
            pick in 0usize..6,
        ) {
            let channels = EventChannels::new(16);
            let mut launches = channels.subscribe_target_launch();
            let mut state = monitored(&targets);
            let target = targets[pick % targets.len()];

            let (n, _) = detected(target);
            route(&mut state, n, &channels.emitter_for(Source::GameEvents));

            prop_assert_eq!(state.active(), Some(TargetId(target)));
            prop_assert_eq!(launches.try_recv().unwrap().target, TargetId(target));
            prop_assert!(launches.try_recv().is_err());
        }
    }
}
