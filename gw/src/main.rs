//! gamewire - telemetry session coordinator
//!
//! CLI entry point for running the coordinators and talking to a running instance.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use gamewire::cli::{Cli, Command, get_log_path};
use gamewire::config::Config;
use gamewire::coordinator::Coordinator;
use gamewire::dispatch::PackageDispatcher;
use gamewire::events::{create_event_channels, spawn_log_forwarder};
use gamewire::ipc::{self, ActiveInfoReply, IpcClient};
use gamewire::overlay::OverlayCoordinator;
use gamewire::sim::{Scenario, SimHost, play};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level from config first, so logging is up before the full load
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run { scenario } => cmd_run(config, scenario).await,
        Command::Negotiate => cmd_negotiate(&config).await,
        Command::Info => cmd_info(&config).await,
        Command::ShowOverlay => cmd_show_overlay(&config).await,
        Command::Ping => cmd_ping(&config).await,
    }
}

fn client(config: &Config) -> IpcClient {
    IpcClient::with_socket_path(config.ipc.socket_path()).with_timeout(config.ipc.timeout())
}

async fn cmd_run(config: Config, scenario_path: Option<PathBuf>) -> Result<()> {
    debug!(?scenario_path, "cmd_run: called");

    // Parse the scenario up front so a typo fails before anything starts
    let scenario = scenario_path.as_deref().map(Scenario::load).transpose()?;

    let channels = create_event_channels();
    let forwarder = spawn_log_forwarder(&channels);

    let host = Arc::new(SimHost::new());
    let gep = Coordinator::new(config.game_events.clone(), host.clone(), &channels);
    let overlay = OverlayCoordinator::new(config.overlay.clone(), host.clone(), &channels);
    let dispatcher = PackageDispatcher::new(
        gep.handle(),
        overlay.handle(),
        config.game_events.package_name.clone(),
        config.overlay.package_name.clone(),
    );
    let gep_task = tokio::spawn(gep.run());
    let overlay_task = tokio::spawn(overlay.run());

    dispatcher
        .game_events()
        .set_monitored_targets(config.targets.clone())
        .await?;
    dispatcher.overlay().set_targets(config.targets.clone()).await?;
    info!(targets = ?config.targets, "Coordinators started");

    let (ipc_listener, socket_path) = ipc::create_listener_at(&config.ipc.socket_path())?;
    info!(?socket_path, "IPC socket listening");
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let ipc_task = tokio::spawn(ipc::serve(
        ipc_listener,
        dispatcher.clone(),
        config.ipc.timeout(),
        shutdown_rx,
    ));

    let scenario_task = match scenario {
        Some(scenario) => {
            let host = host.clone();
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                match play(&scenario, &host, &dispatcher).await {
                    Ok(steps) => info!(steps, "Scenario finished"),
                    Err(e) => tracing::error!(error = %e, "Scenario failed"),
                }
            })
        }
        None => {
            // No script: bring both packages up so the IPC surface is usable
            host.load_game_events();
            host.load_overlay();
            let version = env!("CARGO_PKG_VERSION");
            dispatcher.package_ready(&config.game_events.package_name, version).await;
            dispatcher.package_ready(&config.overlay.package_name, version).await;
            tokio::spawn(async {})
        }
    };

    println!("gamewire running on {}. Press Ctrl+C to stop.", socket_path.display());

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        warn!("Ctrl+C received");
    }

    info!("Shutting down...");
    scenario_task.abort();
    let _ = shutdown_tx.send(()).await;
    let _ = ipc_task.await;
    ipc::cleanup_socket(&socket_path);

    if let Err(e) = dispatcher.game_events().shutdown().await {
        warn!(error = %e, "Game events coordinator already stopped");
    }
    if let Err(e) = dispatcher.overlay().shutdown().await {
        warn!(error = %e, "Overlay coordinator already stopped");
    }
    let _ = gep_task.await;
    let _ = overlay_task.await;

    forwarder.abort();
    info!("Shutdown complete");
    Ok(())
}

async fn cmd_negotiate(config: &Config) -> Result<()> {
    let success = client(config).negotiate_features().await?;
    println!("negotiated: {success}");
    Ok(())
}

async fn cmd_info(config: &Config) -> Result<()> {
    match client(config).active_info().await? {
        ActiveInfoReply::Info(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        reply @ ActiveInfoReply::NoActiveTarget(_) => println!("{}", reply.render()),
    }
    Ok(())
}

async fn cmd_show_overlay(config: &Config) -> Result<()> {
    client(config).show_overlay_windows().await?;
    println!("overlay windows shown");
    Ok(())
}

async fn cmd_ping(config: &Config) -> Result<()> {
    let client = client(config);
    if !client.socket_exists() {
        println!("gamewire is not running");
        return Ok(());
    }
    let version = client.ping().await?;
    println!("gamewire is running (version {version})");
    Ok(())
}
