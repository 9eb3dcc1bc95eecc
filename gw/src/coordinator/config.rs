//! Coordinator configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Game-events coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Package name the host reports when the game-events package is ready
    #[serde(rename = "package-name", default = "default_package_name")]
    pub package_name: String,

    /// Channel buffer size for coordinator requests
    #[serde(rename = "channel-buffer", default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

fn default_package_name() -> String {
    debug!("default_package_name: called");
    "gep".to_string()
}

fn default_channel_buffer() -> usize {
    debug!("default_channel_buffer: called");
    100
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        debug!("CoordinatorConfig::default: called");
        Self {
            package_name: default_package_name(),
            channel_buffer: default_channel_buffer(),
        }
    }
}

impl CoordinatorConfig {
    /// Whether a host ready notification is meant for this coordinator
    pub fn matches_package(&self, name: &str) -> bool {
        debug!(%name, package_name = %self.package_name, "CoordinatorConfig::matches_package: called");
        self.package_name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.package_name, "gep");
        assert_eq!(config.channel_buffer, 100);
    }

    #[test]
    fn test_matches_package() {
        let config = CoordinatorConfig::default();
        assert!(config.matches_package("gep"));
        assert!(!config.matches_package("overlay"));
        assert!(!config.matches_package("GEP"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: CoordinatorConfig = serde_yaml::from_str("channel-buffer: 8").unwrap();
        assert_eq!(config.package_name, "gep");
        assert_eq!(config.channel_buffer, 8);
    }
}
