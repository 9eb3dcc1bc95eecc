//! Gamewire configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinator::CoordinatorConfig;
use crate::overlay::OverlayConfig;
use crate::subsystem::TargetId;

/// Main gamewire configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Games to monitor and register with the overlay
    pub targets: Vec<TargetId>,

    /// Game-events coordinator
    #[serde(rename = "game-events")]
    pub game_events: CoordinatorConfig,

    /// Overlay coordinator
    pub overlay: OverlayConfig,

    /// Socket for UI and CLI requests
    pub ipc: IpcConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.game_events.package_name.is_empty() {
            return Err(eyre::eyre!("game-events.package-name must not be empty"));
        }
        if self.overlay.package_name.is_empty() {
            return Err(eyre::eyre!("overlay.package-name must not be empty"));
        }
        if self.game_events.package_name == self.overlay.package_name {
            return Err(eyre::eyre!(
                "game-events and overlay share package name '{}'",
                self.overlay.package_name
            ));
        }
        if self.game_events.channel_buffer == 0 || self.overlay.channel_buffer == 0 {
            return Err(eyre::eyre!("channel-buffer must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .gamewire.yml
        let local_config = PathBuf::from(".gamewire.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/gamewire/gamewire.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gamewire").join("gamewire.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Log level from config, read before logging is set up
    ///
    /// Any failure yields None; the full load later reports it properly.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// IPC socket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Socket path; the per-user runtime dir when unset
    #[serde(rename = "socket-path")]
    pub socket_path: Option<PathBuf>,

    /// Client connect/read/write timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout_ms: 5_000,
        }
    }
}

impl IpcConfig {
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(crate::ipc::get_socket_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.targets.is_empty());
        assert_eq!(config.game_events.package_name, "gep");
        assert_eq!(config.overlay.package_name, "overlay");
        assert_eq!(config.overlay.registration_delay_ms, 2_000);
        assert_eq!(config.ipc.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
targets: [21640, 5426]

game-events:
  package-name: gep-beta
  channel-buffer: 16

overlay:
  registration-delay-ms: 500

ipc:
  socket-path: /tmp/gw-test.sock
  timeout-ms: 1000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.targets, vec![TargetId(21640), TargetId(5426)]);
        assert_eq!(config.game_events.package_name, "gep-beta");
        assert_eq!(config.game_events.channel_buffer, 16);
        assert_eq!(config.overlay.registration_delay_ms, 500);
        assert_eq!(config.overlay.package_name, "overlay");
        assert_eq!(config.ipc.socket_path(), PathBuf::from("/tmp/gw-test.sock"));
        assert_eq!(config.ipc.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.game_events.package_name.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.overlay.channel_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.overlay.package_name = "gep".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "targets: [7]").unwrap();
        writeln!(file, "log-level: warn").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.targets, vec![TargetId(7)]);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/gamewire.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }
}
