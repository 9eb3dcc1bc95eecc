//! Scripted sessions replayed against the simulated host

use std::path::Path;
use std::time::Duration;

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::host::SimHost;
use crate::dispatch::PackageDispatcher;
use crate::subsystem::TargetId;

/// One scripted step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum Step {
    /// (Re)load a package and report it ready
    Ready { package: String, version: String },
    Detect {
        target: TargetId,
        name: String,
        #[serde(default)]
        info: Value,
    },
    InfoUpdate {
        target: TargetId,
        #[serde(default)]
        args: Vec<Value>,
    },
    GameEvent {
        target: TargetId,
        #[serde(default)]
        args: Vec<Value>,
    },
    Elevated { target: TargetId },
    Error { target: TargetId, message: String },
    Launch {
        #[serde(default)]
        info: Value,
    },
    Injected {
        #[serde(default)]
        info: Value,
    },
    Exit {
        #[serde(default)]
        info: Value,
    },
    Sleep { ms: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "Scenario::load: called");
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read scenario {}", path.display()))?;
        Self::from_yaml(&content)
    }
}

/// Replay every step in order; returns the number of steps played
pub async fn play(scenario: &Scenario, host: &SimHost, dispatcher: &PackageDispatcher) -> Result<usize> {
    info!(steps = scenario.steps.len(), "Replaying scenario");

    for (index, step) in scenario.steps.iter().enumerate() {
        debug!(index, ?step, "play: step");
        match step {
            Step::Ready { package, version } => {
                if package == &dispatcher.game_events_package() {
                    host.load_game_events();
                } else if package == &dispatcher.overlay_package() {
                    host.load_overlay();
                } else {
                    warn!(%package, "Scenario readies an unknown package");
                }
                dispatcher.package_ready(package, version).await;
            }
            Step::Detect { target, name, info } => {
                game_events(host)?.detect(*target, name, info.clone());
            }
            Step::InfoUpdate { target, args } => game_events(host)?.info_update(*target, args.clone()),
            Step::GameEvent { target, args } => game_events(host)?.game_event(*target, args.clone()),
            Step::Elevated { target } => game_events(host)?.elevated(*target),
            Step::Error { target, message } => game_events(host)?.error(*target, message),
            Step::Launch { info } => {
                overlay(host)?.launch(info.clone());
            }
            Step::Injected { info } => overlay(host)?.injected(info.clone()),
            Step::Exit { info } => overlay(host)?.exit(info.clone()),
            Step::Sleep { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
        }
    }

    Ok(scenario.steps.len())
}

fn game_events(host: &SimHost) -> Result<std::sync::Arc<super::SimGameEvents>> {
    host.sim_game_events()
        .ok_or_else(|| eyre!("Game events package not loaded; add a ready step first"))
}

fn overlay(host: &SimHost) -> Result<std::sync::Arc<super::SimOverlay>> {
    host.sim_overlay()
        .ok_or_else(|| eyre!("Overlay package not loaded; add a ready step first"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENARIO: &str = r#"
steps:
  - step: ready
    package: gep
    version: "1.2.0"
  - step: detect
    target: 21640
    name: VALORANT
    info: { pid: 4242 }
  - step: game-event
    target: 21640
    args: [{ name: kill }]
  - step: sleep
    ms: 5
  - step: exit
"#;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_yaml(SCENARIO).unwrap();
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(
            scenario.steps[0],
            Step::Ready {
                package: "gep".to_string(),
                version: "1.2.0".to_string()
            }
        );
        assert_eq!(
            scenario.steps[1],
            Step::Detect {
                target: TargetId(21640),
                name: "VALORANT".to_string(),
                info: json!({"pid": 4242}),
            }
        );
        assert_eq!(scenario.steps[3], Step::Sleep { ms: 5 });
        assert_eq!(scenario.steps[4], Step::Exit { info: Value::Null });
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Scenario::from_yaml("steps:\n  - step: teleport\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.steps.len(), 5);
    }
}
