//! Main Coordinator task implementation

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::CoordinatorConfig;
use super::error::CoordinatorError;
use super::handle::CoordinatorHandle;
use super::messages::{ActiveInfo, CoordRequest, SessionSnapshot};
use super::negotiator::{negotiate_all, negotiate_one};
use super::router::{Binding, next_notification, route};
use super::state::SessionState;
use crate::events::{EventChannels, EventEmitter, Source};
use crate::subsystem::{GameEventsApi, GameEventsNotification, PackageHost};

/// Everything the task owns while running
struct Session {
    state: SessionState,
    api: Option<Arc<dyn GameEventsApi>>,
    binding: Option<Binding<GameEventsNotification>>,
}

/// The telemetry session coordinator for the game-events package
///
/// Owns the monitored target set and the active target, binds to the package
/// every time the host reports it ready, and routes its notifications onto the
/// outward event channels.
pub struct Coordinator {
    config: CoordinatorConfig,
    host: Arc<dyn PackageHost>,
    emitter: EventEmitter,
    tx: mpsc::Sender<CoordRequest>,
    rx: mpsc::Receiver<CoordRequest>,
}

impl Coordinator {
    /// Create a new Coordinator with the given configuration
    pub fn new(config: CoordinatorConfig, host: Arc<dyn PackageHost>, channels: &EventChannels) -> Self {
        debug!(package_name = %config.package_name, "Coordinator::new: called");
        let (tx, rx) = mpsc::channel(config.channel_buffer);
        Self {
            config,
            host,
            emitter: channels.emitter_for(Source::GameEvents),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle::new(self.tx.clone())
    }

    /// Run the Coordinator task
    ///
    /// This consumes the Coordinator and runs until shutdown is requested or
    /// every handle is dropped.
    pub async fn run(mut self) {
        let mut session = Session {
            state: SessionState::new(),
            api: None,
            binding: None,
        };

        info!("Game events coordinator started");

        loop {
            tokio::select! {
                biased;

                notification = next_notification(&mut session.binding) => match notification {
                    Some(notification) => route(&mut session.state, notification, &self.emitter),
                    None => {
                        warn!(epoch = session.state.epoch(), "Package dropped our listener, binding discarded");
                        session.binding = None;
                    }
                },

                req = self.rx.recv() => match req {
                    Some(CoordRequest::Shutdown) | None => break,
                    Some(req) => self.handle_request(req, &mut session),
                },
            }
        }

        if let (Some(api), Some(binding)) = (&session.api, session.binding.take()) {
            api.unlisten(binding.listener_id());
        }
        info!("Game events coordinator stopped");
    }

    fn handle_request(&self, req: CoordRequest, session: &mut Session) {
        match req {
            CoordRequest::SetTargets { targets, reply } => {
                debug!(?targets, "Setting monitored targets");
                self.emitter
                    .log("register to game events for", vec![serde_json::json!(targets)]);
                session.state.set_targets(targets);
                let _ = reply.send(());
            }

            CoordRequest::PackageReady { name, version, reply } => {
                if !self.config.matches_package(&name) {
                    debug!(%name, "Ignoring ready for another package");
                    let _ = reply.send(Ok(false));
                    return;
                }

                self.emitter.log(format!("gep package is ready: {version}"), vec![]);
                match self.bind(session) {
                    Ok(epoch) => {
                        info!(%version, epoch, "Bound to game events package");
                        self.spawn_negotiation(session);
                        self.emitter.ready(&version);
                        let _ = reply.send(Ok(true));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to bind game events package");
                        let _ = reply.send(Err(e));
                    }
                }
            }

            CoordRequest::NegotiateAll { reply } => {
                let api = session.api.clone();
                let targets = session.state.targets().to_vec();
                let emitter = self.emitter.clone();
                tokio::spawn(async move {
                    let report = negotiate_all(api, targets, emitter).await;
                    let _ = reply.send(report);
                });
            }

            CoordRequest::NegotiateFeatures {
                target,
                features,
                reply,
            } => {
                let api = session.api.clone();
                let emitter = self.emitter.clone();
                tokio::spawn(async move {
                    let ok = negotiate_one(api, target, features, emitter).await.is_ok();
                    let _ = reply.send(ok);
                });
            }

            CoordRequest::ActiveInfo { reply } => {
                let Some(target) = session.state.active() else {
                    debug!("Active info requested with no active target");
                    let _ = reply.send(Ok(ActiveInfo::NoActiveTarget));
                    return;
                };
                let Some(api) = session.api.clone() else {
                    let _ = reply.send(Err(CoordinatorError::NotBound("game events")));
                    return;
                };
                tokio::spawn(async move {
                    let result = api
                        .get_info(target)
                        .await
                        .map(ActiveInfo::Info)
                        .map_err(CoordinatorError::from);
                    let _ = reply.send(result);
                });
            }

            CoordRequest::Snapshot { reply } => {
                let _ = reply.send(SessionSnapshot {
                    targets: session.state.targets().to_vec(),
                    active: session.state.active(),
                    epoch: session.state.epoch(),
                    bound: session.binding.is_some(),
                });
            }

            CoordRequest::Shutdown => {}
        }
    }

    /// Replace our listener on the (possibly restarted) package
    fn bind(&self, session: &mut Session) -> Result<u64, CoordinatorError> {
        let api = self
            .host
            .game_events()
            .ok_or(CoordinatorError::PackageUnavailable("game events"))?;

        if let Some(previous) = session.binding.take() {
            debug!(epoch = previous.epoch(), "Dropping previous binding");
            if let Some(old_api) = &session.api {
                old_api.unlisten(previous.listener_id());
            }
        }

        let epoch = session.state.next_epoch();
        session.binding = Some(Binding::new(epoch, api.listen()));
        session.api = Some(api);
        Ok(epoch)
    }

    /// A fresh binding means the package lost every subscription
    fn spawn_negotiation(&self, session: &Session) {
        let api = session.api.clone();
        let targets = session.state.targets().to_vec();
        let emitter = self.emitter.clone();
        tokio::spawn(async move {
            let report = negotiate_all(api, targets, emitter).await;
            debug!(?report, "Post-bind negotiation finished");
        });
    }
}
