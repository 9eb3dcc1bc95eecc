//! IPC listener for the coordinator process
//!
//! Provides helpers for creating and managing the Unix Domain Socket listener
//! and the accept loop that answers requests from the coordinators.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::MAX_REQUEST_SIZE;
use super::messages::{IpcRequest, IpcResponse};
use crate::coordinator::{ActiveInfo, NO_ACTIVE_TARGET};
use crate::dispatch::PackageDispatcher;

/// Create and bind a listener, replacing any stale socket file
pub fn create_listener_at(socket_path: &Path) -> Result<(UnixListener, PathBuf)> {
    debug!(?socket_path, "create_listener: creating IPC socket");

    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
    }

    if socket_path.exists() {
        debug!(?socket_path, "create_listener: removing stale socket");
        std::fs::remove_file(socket_path).context("Failed to remove stale socket")?;
    }

    let listener = UnixListener::bind(socket_path).context("Failed to bind IPC socket")?;
    debug!(?socket_path, "create_listener: socket bound successfully");

    Ok((listener, socket_path.to_path_buf()))
}

/// Remove the socket file on shutdown
pub fn cleanup_socket(socket_path: &Path) {
    if socket_path.exists() {
        debug!(?socket_path, "cleanup_socket: removing socket file");
        if let Err(e) = std::fs::remove_file(socket_path) {
            warn!(?socket_path, error = %e, "Failed to remove socket file");
        }
    }
}

/// Read one newline-terminated request
///
/// Never buffers more than one byte past `MAX_REQUEST_SIZE`.
pub async fn read_message(stream: &mut UnixStream) -> Result<IpcRequest> {
    let mut reader = BufReader::new(stream).take(MAX_REQUEST_SIZE as u64 + 1);
    let mut line = String::new();

    let bytes_read = reader
        .read_line(&mut line)
        .await
        .context("Failed to read IPC request")?;

    if bytes_read > MAX_REQUEST_SIZE {
        return Err(eyre::eyre!("Request exceeds {} bytes", MAX_REQUEST_SIZE));
    }

    if line.is_empty() {
        return Err(eyre::eyre!("Empty request received"));
    }

    let request: IpcRequest = serde_json::from_str(line.trim()).context("Failed to parse IPC request")?;
    debug!(?request, "read_message: parsed request");

    Ok(request)
}

/// Send a response on the stream
pub async fn send_response(stream: &mut UnixStream, response: IpcResponse) -> Result<()> {
    let response_json = serde_json::to_string(&response).context("Failed to serialize response")?;
    stream
        .write_all(response_json.as_bytes())
        .await
        .context("Failed to write response")?;
    stream.write_all(b"\n").await.context("Failed to write newline")?;
    stream.flush().await.context("Failed to flush response")?;
    debug!(?response, "send_response: sent response");
    Ok(())
}

/// Answer one request using the coordinators behind the dispatcher
pub async fn handle_request(request: IpcRequest, dispatcher: &PackageDispatcher) -> IpcResponse {
    debug!(?request, "handle_request: called");
    match request {
        IpcRequest::NegotiateFeatures => match dispatcher.game_events().negotiate_all_features().await {
            Ok(report) => {
                debug!(?report, "handle_request: negotiation finished");
                IpcResponse::Negotiated { success: true }
            }
            Err(e) => IpcResponse::Error { message: e.to_string() },
        },

        IpcRequest::GetActiveInfo => match dispatcher.game_events().active_target_info().await {
            Ok(ActiveInfo::Info(payload)) => IpcResponse::Info { payload },
            Ok(ActiveInfo::NoActiveTarget) => IpcResponse::NoActiveTarget {
                message: NO_ACTIVE_TARGET.to_string(),
            },
            Err(e) => IpcResponse::Error { message: e.to_string() },
        },

        IpcRequest::ShowOverlayWindows => match dispatcher.overlay().show_all_windows().await {
            Ok(shown) => {
                debug!(shown, "handle_request: overlay windows shown");
                IpcResponse::Ok
            }
            Err(e) => IpcResponse::Error { message: e.to_string() },
        },

        IpcRequest::Ping => IpcResponse::Pong {
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }
}

async fn handle_connection(mut stream: UnixStream, dispatcher: PackageDispatcher, read_timeout: Duration) {
    let response = match tokio::time::timeout(read_timeout, read_message(&mut stream)).await {
        Ok(Ok(request)) => handle_request(request, &dispatcher).await,
        Ok(Err(e)) => {
            warn!(error = %e, "Rejecting malformed IPC request");
            IpcResponse::Error { message: e.to_string() }
        }
        Err(_) => {
            warn!(?read_timeout, "IPC client sent no complete request in time");
            IpcResponse::Error {
                message: "Request timed out".to_string(),
            }
        }
    };
    if let Err(e) = send_response(&mut stream, response).await {
        warn!(error = %e, "Failed to send IPC response");
    }
}

/// Accept connections until a shutdown signal arrives
///
/// Each connection carries one request and is served on its own task. A client
/// that has not sent a full request line within `read_timeout` is answered with
/// an error and disconnected.
pub async fn serve(
    listener: UnixListener,
    dispatcher: PackageDispatcher,
    read_timeout: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    info!("IPC listener started");
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    tokio::spawn(handle_connection(stream, dispatcher.clone(), read_timeout));
                }
                Err(e) => warn!(error = %e, "Failed to accept IPC connection"),
            },
        }
    }
    info!("IPC listener stopped");
}
