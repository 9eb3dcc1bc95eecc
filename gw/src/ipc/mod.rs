//! Inter-Process Communication with the coordinator process
//!
//! Unix Domain Socket carrying one JSON request line and one JSON response line
//! per connection. UI and CLI processes use it to trigger negotiation, query the
//! active target and show the overlay windows.

use std::path::PathBuf;

pub mod client;
pub mod listener;
pub mod messages;

pub use client::{ActiveInfoReply, IpcClient};
pub use listener::{cleanup_socket, create_listener_at, handle_request, serve};
pub use messages::{IpcRequest, IpcResponse};

/// Largest request line accepted
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Largest response line accepted; info payloads can be sizeable
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// Default socket path for the coordinator process
pub fn get_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("gamewire")
        .join("gw.sock")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path_ends_with_gw_sock() {
        let path = get_socket_path();
        assert!(path.ends_with("gamewire/gw.sock"));
    }
}
