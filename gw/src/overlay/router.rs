//! Event routing for the overlay package

use serde_json::json;
use tracing::{debug, info, warn};

use crate::events::EventEmitter;
use crate::subsystem::OverlayNotification;

/// Fan one overlay notification out to the log and dedicated channels
pub fn route(notification: OverlayNotification, emitter: &EventEmitter) {
    debug!(kind = notification.kind(), "overlay::route: called");

    match notification {
        OverlayNotification::GameLaunched { info, injection } => {
            // Intent is always to inject; the decision receiver may still decline
            injection.accept();
            info!("Game launched, injection requested");
            emitter.log("game launched", vec![info.clone()]);
            emitter.injection_decision(injection, info);
        }

        OverlayNotification::InjectionError { info, error } => {
            warn!(%error, "Overlay injection failed");
            emitter.log("game-injection-error", vec![json!(error), info]);
        }

        OverlayNotification::Injected { info } => {
            emitter.log("new game injected!", vec![info]);
        }

        OverlayNotification::FocusChanged { window: _, game, focus } => {
            emitter.log("game window focus changes", vec![json!(game), json!(focus)]);
        }

        OverlayNotification::WindowChanged {
            window,
            game: _,
            reason,
        } => {
            emitter.log("game window info changed", vec![json!(reason), window]);
        }

        OverlayNotification::InputInterceptionChanged { info } => {
            emitter.log("overlay input interception changed", vec![info]);
        }

        OverlayNotification::InputExclusiveModeChanged { info } => {
            emitter.log("overlay input exclusive mode changed", vec![info]);
        }

        OverlayNotification::GameExit { info } => {
            emitter.log("game exit", vec![info.clone()]);
            emitter.game_exit(info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventChannels, Source};
    use crate::subsystem::{Decision, DecisionState};
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_game_launched_requests_injection() {
        let channels = EventChannels::new(16);
        let mut decisions = channels.subscribe_injection_decision();
        let decision = Decision::new();

        route(
            OverlayNotification::GameLaunched {
                info: json!({"id": 21640}),
                injection: decision.clone(),
            },
            &channels.emitter_for(Source::Overlay),
        );

        assert!(decision.is_accepted());
        let request = decisions.try_recv().unwrap();
        assert_eq!(request.info, json!({"id": 21640}));

        // Receiver vetoes; the package sees the same decision
        request.decline();
        assert_eq!(decision.state(), DecisionState::Declined);
    }

    #[test]
    fn test_game_exit_logs_and_emits() {
        let channels = EventChannels::new(16);
        let mut exits = channels.subscribe_game_exit();
        let mut log = channels.subscribe_log();

        route(
            OverlayNotification::GameExit { info: json!({"id": 7}) },
            &channels.emitter_for(Source::Overlay),
        );

        assert_eq!(exits.try_recv().unwrap().info, json!({"id": 7}));
        assert!(matches!(exits.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(log.try_recv().unwrap().message, "game exit");
    }

    #[test]
    fn test_focus_change_only_logs() {
        let channels = EventChannels::new(16);
        let mut log = channels.subscribe_log();
        let mut exits = channels.subscribe_game_exit();
        let mut decisions = channels.subscribe_injection_decision();

        route(
            OverlayNotification::FocusChanged {
                window: json!({"id": 1}),
                game: "VALORANT".to_string(),
                focus: true,
            },
            &channels.emitter_for(Source::Overlay),
        );

        let entry = log.try_recv().unwrap();
        assert_eq!(entry.message, "game window focus changes");
        assert_eq!(entry.args, vec![json!("VALORANT"), json!(true)]);
        assert!(exits.try_recv().is_err());
        assert!(decisions.try_recv().is_err());
    }

    #[test]
    fn test_injection_error_logs_error_first() {
        let channels = EventChannels::new(16);
        let mut log = channels.subscribe_log();

        route(
            OverlayNotification::InjectionError {
                info: json!({"id": 2}),
                error: "access denied".to_string(),
            },
            &channels.emitter_for(Source::Overlay),
        );

        let entry = log.try_recv().unwrap();
        assert_eq!(entry.args, vec![json!("access denied"), json!({"id": 2})]);
    }
}
