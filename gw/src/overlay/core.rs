//! Main OverlayCoordinator task implementation

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::OverlayConfig;
use super::handle::OverlayHandle;
use super::messages::{OverlayRequest, OverlaySnapshot};
use super::router::route;
use crate::coordinator::{Binding, CoordinatorError, next_notification};
use crate::events::{EventChannels, EventEmitter, Source};
use crate::subsystem::{GamesFilter, OverlayApi, OverlayNotification, PackageHost, TargetId};

struct Session {
    targets: Vec<TargetId>,
    epoch: u64,
    api: Option<Arc<dyn OverlayApi>>,
    binding: Option<Binding<OverlayNotification>>,
}

/// Coordinator for the overlay package
///
/// Same lifecycle as the game-events coordinator: rebinds on every ready,
/// routes notifications, and registers the monitored games with the package
/// once the configured delay has passed.
pub struct OverlayCoordinator {
    config: OverlayConfig,
    host: Arc<dyn PackageHost>,
    emitter: EventEmitter,
    tx: mpsc::Sender<OverlayRequest>,
    rx: mpsc::Receiver<OverlayRequest>,
}

impl OverlayCoordinator {
    pub fn new(config: OverlayConfig, host: Arc<dyn PackageHost>, channels: &EventChannels) -> Self {
        debug!(package_name = %config.package_name, "OverlayCoordinator::new: called");
        let (tx, rx) = mpsc::channel(config.channel_buffer);
        Self {
            config,
            host,
            emitter: channels.emitter_for(Source::Overlay),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> OverlayHandle {
        OverlayHandle::new(self.tx.clone())
    }

    /// Run the coordinator until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        let mut session = Session {
            targets: Vec::new(),
            epoch: 0,
            api: None,
            binding: None,
        };

        info!("Overlay coordinator started");

        loop {
            tokio::select! {
                biased;

                notification = next_notification(&mut session.binding) => match notification {
                    Some(notification) => route(notification, &self.emitter),
                    None => {
                        warn!(epoch = session.epoch, "Overlay package dropped our listener");
                        session.binding = None;
                    }
                },

                req = self.rx.recv() => match req {
                    Some(OverlayRequest::Shutdown) | None => break,
                    Some(req) => self.handle_request(req, &mut session),
                },
            }
        }

        if let (Some(api), Some(binding)) = (&session.api, session.binding.take()) {
            api.unlisten(binding.listener_id());
        }
        info!("Overlay coordinator stopped");
    }

    fn handle_request(&self, req: OverlayRequest, session: &mut Session) {
        match req {
            OverlayRequest::SetTargets { targets, reply } => {
                debug!(?targets, "Setting overlay targets");
                session.targets = targets;
                let _ = reply.send(());
            }

            OverlayRequest::PackageReady { name, version, reply } => {
                if !self.config.matches_package(&name) {
                    debug!(%name, "Ignoring ready for another package");
                    let _ = reply.send(Ok(false));
                    return;
                }

                self.emitter.log(format!("overlay package is ready: {version}"), vec![]);
                match self.bind(session) {
                    Ok(api) => {
                        self.emitter.log("registering to overlay package events", vec![]);
                        self.emitter.ready(&version);
                        spawn_registration(
                            api,
                            session.targets.clone(),
                            self.config.registration_delay(),
                            self.emitter.clone(),
                        );
                        let _ = reply.send(Ok(true));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to bind overlay package");
                        let _ = reply.send(Err(e));
                    }
                }
            }

            OverlayRequest::RegisterGames { targets, reply } => {
                let Some(api) = session.api.clone() else {
                    let _ = reply.send(Err(CoordinatorError::NotBound("overlay")));
                    return;
                };
                let emitter = self.emitter.clone();
                tokio::spawn(async move {
                    let _ = reply.send(register(api, targets, &emitter).await);
                });
            }

            OverlayRequest::CreateWindow { options, reply } => {
                let Some(api) = session.api.clone() else {
                    let _ = reply.send(Err(CoordinatorError::NotBound("overlay")));
                    return;
                };
                tokio::spawn(async move {
                    let result = api.create_window(options).await.map_err(CoordinatorError::from);
                    let _ = reply.send(result);
                });
            }

            OverlayRequest::ShowAllWindows { reply } => {
                let Some(api) = session.api.clone() else {
                    let _ = reply.send(Err(CoordinatorError::NotBound("overlay")));
                    return;
                };
                tokio::spawn(async move {
                    let mut shown = 0;
                    for window in api.windows() {
                        match api.show_window(window).await {
                            Ok(()) => shown += 1,
                            Err(e) => warn!(%window, error = %e, "Failed to show overlay window"),
                        }
                    }
                    let _ = reply.send(Ok(shown));
                });
            }

            OverlayRequest::Snapshot { reply } => {
                let _ = reply.send(OverlaySnapshot {
                    targets: session.targets.clone(),
                    epoch: session.epoch,
                    bound: session.binding.is_some(),
                });
            }

            OverlayRequest::Shutdown => {}
        }
    }

    fn bind(&self, session: &mut Session) -> Result<Arc<dyn OverlayApi>, CoordinatorError> {
        let api = self
            .host
            .overlay()
            .ok_or(CoordinatorError::PackageUnavailable("overlay"))?;

        if let (Some(previous), Some(old_api)) = (session.binding.take(), &session.api) {
            debug!(epoch = previous.epoch(), "Dropping previous overlay binding");
            old_api.unlisten(previous.listener_id());
        }

        session.epoch += 1;
        session.binding = Some(Binding::new(session.epoch, api.listen()));
        session.api = Some(api.clone());
        info!(epoch = session.epoch, "Bound to overlay package");
        Ok(api)
    }
}

fn spawn_registration(api: Arc<dyn OverlayApi>, targets: Vec<TargetId>, delay: Duration, emitter: EventEmitter) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = register(api, targets, &emitter).await {
            warn!(error = %e, "Delayed overlay registration failed");
        }
    });
}

async fn register(
    api: Arc<dyn OverlayApi>,
    targets: Vec<TargetId>,
    emitter: &EventEmitter,
) -> Result<(), CoordinatorError> {
    emitter.log("registering to game ids:", vec![json!(targets)]);
    let filter = GamesFilter { games_ids: targets };
    match api.register_games(filter).await {
        Ok(()) => {
            emitter.log("overlay is registered", vec![]);
            Ok(())
        }
        Err(e) => {
            emitter.log("overlay registration failed", vec![json!(e.to_string())]);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use crate::subsystem::WindowOptions;

    fn spawn(host: Arc<SimHost>, delay_ms: u64) -> (OverlayHandle, EventChannels) {
        let channels = EventChannels::new(64);
        let config = OverlayConfig {
            registration_delay_ms: delay_ms,
            ..OverlayConfig::default()
        };
        let coordinator = OverlayCoordinator::new(config, host, &channels);
        let handle = coordinator.handle();
        tokio::spawn(coordinator.run());
        (handle, channels)
    }

    #[tokio::test]
    async fn test_calls_before_bind_are_rejected() {
        let host = Arc::new(SimHost::new());
        let (handle, _channels) = spawn(host, 0);

        let err = handle.show_all_windows().await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NotBound("overlay")));
        let err = handle.create_window(WindowOptions::default()).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NotBound("overlay")));
    }

    #[tokio::test]
    async fn test_ready_registers_after_delay() {
        let host = Arc::new(SimHost::new());
        let sim = host.load_overlay();
        let (handle, _channels) = spawn(host, 20);

        handle.set_targets(vec![TargetId(5426)]).await.unwrap();
        assert!(handle.package_ready("overlay", "2.0").await.unwrap());
        assert!(sim.registrations().is_empty());

        for _ in 0..100 {
            if !sim.registrations().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sim.registrations(), vec![vec![TargetId(5426)]]);
    }

    #[tokio::test]
    async fn test_show_all_windows() {
        let host = Arc::new(SimHost::new());
        let sim = host.load_overlay();
        let (handle, _channels) = spawn(host, 10_000);

        handle.package_ready("overlay", "1").await.unwrap();
        handle.create_window(WindowOptions::default()).await.unwrap();
        handle.create_window(WindowOptions::default()).await.unwrap();

        assert_eq!(handle.show_all_windows().await.unwrap(), 2);
        assert_eq!(sim.visible_windows().len(), 2);
    }

    #[tokio::test]
    async fn test_rebind_replaces_only_own_listener() {
        let host = Arc::new(SimHost::new());
        let sim = host.load_overlay();
        let _co_tenant = sim.listen();
        let (handle, _channels) = spawn(host, 10_000);

        handle.package_ready("overlay", "1").await.unwrap();
        handle.package_ready("overlay", "1").await.unwrap();

        assert_eq!(sim.listener_count(), 2);
        assert_eq!(handle.snapshot().await.unwrap().epoch, 2);
    }

    #[tokio::test]
    async fn test_register_games_skips_delay() {
        let host = Arc::new(SimHost::new());
        let sim = host.load_overlay();
        let (handle, _channels) = spawn(host, 10_000);

        handle.package_ready("overlay", "1").await.unwrap();
        handle.register_games(vec![TargetId(21640)]).await.unwrap();

        assert_eq!(sim.registrations(), vec![vec![TargetId(21640)]]);
    }

    #[tokio::test]
    async fn test_ready_for_other_package_is_ignored() {
        let host = Arc::new(SimHost::new());
        let sim = host.load_overlay();
        let (handle, _channels) = spawn(host, 10_000);

        assert!(!handle.package_ready("gep", "1").await.unwrap());
        assert!(!handle.package_ready("Overlay", "1").await.unwrap());

        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.bound);
        assert_eq!(snapshot.epoch, 0);
        assert_eq!(sim.listener_count(), 0);
    }
}
