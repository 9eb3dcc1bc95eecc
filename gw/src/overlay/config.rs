//! Overlay coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Overlay coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Package name the host reports when the overlay package is ready
    #[serde(rename = "package-name")]
    pub package_name: String,

    /// Channel buffer size for coordinator requests
    #[serde(rename = "channel-buffer")]
    pub channel_buffer: usize,

    /// Wait between the package becoming ready and registering games with it
    #[serde(rename = "registration-delay-ms")]
    pub registration_delay_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        debug!("OverlayConfig::default: called");
        Self {
            package_name: "overlay".to_string(),
            channel_buffer: 100,
            registration_delay_ms: 2_000,
        }
    }
}

impl OverlayConfig {
    /// Whether a host ready notification is meant for this coordinator
    pub fn matches_package(&self, name: &str) -> bool {
        debug!(%name, package_name = %self.package_name, "OverlayConfig::matches_package: called");
        self.package_name == name
    }

    pub fn registration_delay(&self) -> Duration {
        debug!(registration_delay_ms = %self.registration_delay_ms, "OverlayConfig::registration_delay: called");
        Duration::from_millis(self.registration_delay_ms)
    }
}
