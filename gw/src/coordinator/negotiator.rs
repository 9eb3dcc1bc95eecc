//! Feature negotiation with the game-events package
//!
//! Each target is negotiated independently: supported features differ per game
//! and are not known up front, so one rejected target must never hold back the
//! others. Failures are logged and reported, never retried.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::events::EventEmitter;
use crate::subsystem::{FeatureSelection, GameEventsApi, SubsystemError, TargetId};

/// Outcome of one bulk negotiation round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationReport {
    pub attempted: Vec<TargetId>,
    pub succeeded: Vec<TargetId>,
    pub failed: Vec<(TargetId, String)>,
}

impl NegotiationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

async fn request(
    api: Option<&Arc<dyn GameEventsApi>>,
    target: TargetId,
    features: FeatureSelection,
) -> Result<(), SubsystemError> {
    match api {
        Some(api) => api.set_required_features(target, features).await,
        None => Err(SubsystemError::NotBound),
    }
}

/// Request every feature for every target concurrently and wait for all of them
pub async fn negotiate_all(
    api: Option<Arc<dyn GameEventsApi>>,
    targets: Vec<TargetId>,
    emitter: EventEmitter,
) -> NegotiationReport {
    debug!(?targets, bound = api.is_some(), "negotiate_all: called");

    let attempts = targets.iter().map(|&target| {
        let api = api.as_ref();
        let emitter = &emitter;
        async move {
            let result = request(api, target, FeatureSelection::All).await;
            if let Err(e) = &result {
                warn!(%target, error = %e, "negotiate_all: set-required-features failed");
                emitter.log(format!("error set-required-feature for: {target}"), vec![json!(e.to_string())]);
            }
            (target, result)
        }
    });
    let outcomes = join_all(attempts).await;

    let mut report = NegotiationReport {
        attempted: targets.clone(),
        ..Default::default()
    };
    for (target, result) in outcomes {
        match result {
            Ok(()) => report.succeeded.push(target),
            Err(e) => report.failed.push((target, e.to_string())),
        }
    }

    let joined = targets.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
    emitter.log(format!("set-required-feature for games: {joined}"), vec![]);
    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "negotiate_all: round complete"
    );
    report
}

/// Request specific features for one target
///
/// The error is returned for the caller to absorb; it has already been logged.
pub async fn negotiate_one(
    api: Option<Arc<dyn GameEventsApi>>,
    target: TargetId,
    features: FeatureSelection,
    emitter: EventEmitter,
) -> Result<(), SubsystemError> {
    debug!(%target, %features, "negotiate_one: called");
    emitter.log(format!("set-required-feature for: {target}"), vec![]);

    let result = request(api.as_ref(), target, features).await;
    if let Err(e) = &result {
        warn!(%target, error = %e, "negotiate_one: set-required-features failed");
        emitter.log(format!("error set-required-feature for: {target}"), vec![json!(e.to_string())]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannels;
    use crate::events::Source;
    use crate::sim::SimGameEvents;

    fn ids(raw: &[u32]) -> Vec<TargetId> {
        raw.iter().copied().map(TargetId).collect()
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_batch() {
        let sim = Arc::new(SimGameEvents::new());
        sim.fail_target(TargetId(7));
        let channels = EventChannels::new(32);
        let mut log = channels.subscribe_log();
        let api: Arc<dyn GameEventsApi> = sim.clone();

        let report = negotiate_all(
            Some(api),
            ids(&[5, 7, 11]),
            channels.emitter_for(Source::GameEvents),
        )
        .await;

        assert_eq!(sim.feature_requests().len(), 3);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, TargetId(7));
        assert!(!report.is_complete());

        let mut messages = Vec::new();
        while let Ok(entry) = log.try_recv() {
            messages.push(entry.message);
        }
        assert_eq!(messages.last().unwrap(), "set-required-feature for games: 5,7,11");
        assert!(messages.contains(&"error set-required-feature for: 7".to_string()));
    }

    #[tokio::test]
    async fn test_unbound_fails_every_target() {
        let channels = EventChannels::new(32);
        let report = negotiate_all(None, ids(&[1, 2]), channels.emitter_for(Source::GameEvents)).await;

        assert_eq!(report.attempted, ids(&[1, 2]));
        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_target_set() {
        let channels = EventChannels::new(8);
        let report = negotiate_all(None, vec![], channels.emitter_for(Source::GameEvents)).await;
        assert!(report.attempted.is_empty());
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_negotiate_one_passes_explicit_features() {
        let sim = Arc::new(SimGameEvents::new());
        let channels = EventChannels::new(8);
        let api: Arc<dyn GameEventsApi> = sim.clone();

        negotiate_one(
            Some(api),
            TargetId(21640),
            FeatureSelection::only(["kill", "death"]),
            channels.emitter_for(Source::GameEvents),
        )
        .await
        .unwrap();

        assert_eq!(
            sim.feature_requests(),
            vec![(TargetId(21640), FeatureSelection::only(["kill", "death"]))]
        );
    }

    #[tokio::test]
    async fn test_negotiate_one_logs_failure() {
        let sim = Arc::new(SimGameEvents::new());
        sim.fail_target(TargetId(3));
        let channels = EventChannels::new(8);
        let mut log = channels.subscribe_log();
        let api: Arc<dyn GameEventsApi> = sim;

        let result = negotiate_one(
            Some(api),
            TargetId(3),
            FeatureSelection::default(),
            channels.emitter_for(Source::GameEvents),
        )
        .await;

        assert_eq!(result, Err(SubsystemError::Unsupported(TargetId(3))));
        assert_eq!(log.recv().await.unwrap().message, "set-required-feature for: 3");
        assert_eq!(log.recv().await.unwrap().message, "error set-required-feature for: 3");
    }
}
