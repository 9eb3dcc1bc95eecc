//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gamewire - telemetry session coordinator for game-event and overlay packages
#[derive(Parser)]
#[command(
    name = "gw",
    about = "Telemetry session coordinator for game-event and overlay packages",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run both coordinators against the simulated host until Ctrl+C
    Run {
        /// YAML scenario to replay once the coordinators are up
        #[arg(short, long, value_name = "FILE")]
        scenario: Option<PathBuf>,
    },

    /// Ask a running coordinator to re-negotiate features for all targets
    Negotiate,

    /// Print info for the active target
    Info,

    /// Show every overlay window
    ShowOverlay,

    /// Check a running coordinator is alive
    Ping,
}

/// Path to the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gamewire")
        .join("logs")
        .join("gamewire.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_scenario() {
        let cli = Cli::try_parse_from(["gw", "-l", "debug", "run", "--scenario", "s.yml"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Run { scenario } => assert_eq!(scenario, Some(PathBuf::from("s.yml"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_client_commands() {
        assert!(matches!(
            Cli::try_parse_from(["gw", "show-overlay"]).unwrap().command,
            Command::ShowOverlay
        ));
        assert!(matches!(
            Cli::try_parse_from(["gw", "info", "--config", "gw.yml"]).unwrap().command,
            Command::Info
        ));
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("gamewire/logs/gamewire.log"));
    }
}
