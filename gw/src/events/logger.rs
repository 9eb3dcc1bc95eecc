//! Log forwarder - drains the log channel into tracing
//!
//! Coordinators publish human-oriented log entries on the `log` channel for
//! UI consumers; the forwarder also mirrors them into the process log file.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::bus::EventChannels;
use super::types::LogEntry;

/// Consumes the log channel until every sender is dropped
pub struct LogForwarder {
    rx: broadcast::Receiver<LogEntry>,
}

impl LogForwarder {
    /// Subscribe now so nothing emitted after this call is missed
    pub fn new(channels: &EventChannels) -> Self {
        debug!("LogForwarder::new: subscribing to log channel");
        Self {
            rx: channels.subscribe_log(),
        }
    }

    /// Run until the channel closes; returns the number of entries forwarded
    pub async fn run(mut self) -> usize {
        debug!("LogForwarder::run: starting");
        let mut forwarded = 0;

        loop {
            match self.rx.recv().await {
                Ok(entry) => {
                    info!(source = entry.source.as_str(), "{}", entry.render());
                    forwarded += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "LogForwarder: lagged behind, missed entries");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("LogForwarder: channel closed, shutting down");
                    break;
                }
            }
        }

        forwarded
    }
}

/// Spawn the forwarder as a background task
pub fn spawn_log_forwarder(channels: &EventChannels) -> tokio::task::JoinHandle<usize> {
    let forwarder = LogForwarder::new(channels);
    tokio::spawn(forwarder.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Source;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_forwarder_drains_until_closed() {
        let channels = EventChannels::new(16);
        let handle = spawn_log_forwarder(&channels);

        let emitter = channels.emitter_for(Source::GameEvents);
        emitter.log("first", vec![]);
        emitter.log("second", vec![json!(7)]);

        drop(emitter);
        drop(channels);

        let forwarded = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("forwarder should stop once channels are dropped")
            .unwrap();
        assert_eq!(forwarded, 2);
    }
}
