//! IPC message types
//!
//! Simple JSON-over-newline protocol. Each message is a single line of JSON followed by `\n`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests from a UI or CLI process to the coordinator process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IpcRequest {
    /// Re-request every feature for every monitored target
    NegotiateFeatures,

    /// Info for the active target
    GetActiveInfo,

    /// Make every overlay window visible
    ShowOverlayWindows,

    /// Ping to check if the coordinator process is alive
    Ping,
}

/// Responses from the coordinator process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum IpcResponse {
    /// Acknowledgment
    Ok,

    /// Negotiation finished; per-target failures only show up in the log
    Negotiated { success: bool },

    Info { payload: Value },

    /// No target is active; `message` carries the sentinel text
    NoActiveTarget { message: String },

    Pong { version: String },

    Error { message: String },
}
