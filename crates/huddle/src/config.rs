//! Per-connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Liveness settings applied to every connection.
///
/// The server pings each connection every `keepalive_interval`. Any frame
/// from the peer, including the pong, counts as activity. A connection
/// that has been silent for longer than `idle_timeout` is treated as
/// closed, which removes its participant from the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub keepalive_interval: Duration,
    pub idle_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
        }
    }
}
