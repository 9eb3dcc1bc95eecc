//! IPC client for talking to a running coordinator process

use std::path::PathBuf;
use std::time::Duration;

use eyre::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use super::messages::{IpcRequest, IpcResponse};
use super::{MAX_REQUEST_SIZE, MAX_RESPONSE_SIZE, get_socket_path};
use crate::coordinator::NO_ACTIVE_TARGET;

/// Default timeout for IPC operations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What `active_info` found
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveInfoReply {
    Info(Value),
    NoActiveTarget(String),
}

/// Client for the coordinator process's socket
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IpcClient {
    /// Create a new client with the default socket path
    pub fn new() -> Self {
        Self {
            socket_path: get_socket_path(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    /// Ask the coordinator to re-negotiate features for all monitored targets
    pub async fn negotiate_features(&self) -> Result<bool> {
        debug!("IpcClient: requesting feature negotiation");
        match self.send_request(IpcRequest::NegotiateFeatures).await? {
            IpcResponse::Negotiated { success } => Ok(success),
            other => Err(unexpected(other)),
        }
    }

    pub async fn active_info(&self) -> Result<ActiveInfoReply> {
        debug!("IpcClient: requesting active target info");
        match self.send_request(IpcRequest::GetActiveInfo).await? {
            IpcResponse::Info { payload } => Ok(ActiveInfoReply::Info(payload)),
            IpcResponse::NoActiveTarget { message } => Ok(ActiveInfoReply::NoActiveTarget(message)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn show_overlay_windows(&self) -> Result<()> {
        debug!("IpcClient: requesting overlay windows");
        match self.send_request(IpcRequest::ShowOverlayWindows).await? {
            IpcResponse::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Check the coordinator process is alive and get its version
    pub async fn ping(&self) -> Result<String> {
        debug!("IpcClient: pinging");
        match self.send_request(IpcRequest::Ping).await? {
            IpcResponse::Pong { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    async fn send_request(&self, request: IpcRequest) -> Result<IpcResponse> {
        debug!(?self.socket_path, ?request, "IpcClient: sending request");

        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to coordinator socket")?;

        self.send_on_stream(stream, request).await
    }

    async fn send_on_stream(&self, mut stream: UnixStream, request: IpcRequest) -> Result<IpcResponse> {
        let request_json = serde_json::to_string(&request).context("Failed to serialize request")?;
        if request_json.len() > MAX_REQUEST_SIZE {
            return Err(eyre::eyre!("Request too large: {} bytes", request_json.len()));
        }

        tokio::time::timeout(self.timeout, async {
            stream
                .write_all(request_json.as_bytes())
                .await
                .context("Failed to write request")?;
            stream.write_all(b"\n").await.context("Failed to write newline")?;
            stream.flush().await.context("Failed to flush stream")?;
            Ok::<_, eyre::Error>(())
        })
        .await
        .context("Write timeout")??;

        let mut reader = BufReader::new(&mut stream);
        let mut response_line = String::new();

        tokio::time::timeout(self.timeout, async {
            let bytes_read = reader
                .read_line(&mut response_line)
                .await
                .context("Failed to read response")?;

            if bytes_read > MAX_RESPONSE_SIZE {
                return Err(eyre::eyre!("Response too large: {} bytes", bytes_read));
            }

            Ok::<_, eyre::Error>(())
        })
        .await
        .context("Read timeout")??;

        let response: IpcResponse =
            serde_json::from_str(response_line.trim()).context("Failed to parse coordinator response")?;

        debug!(?response, "IpcClient: received response");
        Ok(response)
    }
}

fn unexpected(response: IpcResponse) -> eyre::Error {
    match response {
        IpcResponse::Error { message } => eyre::eyre!("Coordinator error: {}", message),
        other => eyre::eyre!("Unexpected response: {:?}", other),
    }
}

impl ActiveInfoReply {
    /// Text a UI would show: the payload as JSON, or the sentinel
    pub fn render(&self) -> String {
        match self {
            ActiveInfoReply::Info(payload) => payload.to_string(),
            ActiveInfoReply::NoActiveTarget(message) if message.is_empty() => NO_ACTIVE_TARGET.to_string(),
            ActiveInfoReply::NoActiveTarget(message) => message.clone(),
        }
    }
}
