//! Lobby configuration.

use serde::{Deserialize, Serialize};

/// Default capacity of the lobby task's command channel.
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// Default number of frames buffered per connection before it is dropped.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 16;

/// Settings for a lobby instance.
///
/// Start from `LobbyConfig::default()` and override the fields you care
/// about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Maximum participants in the roster at once.
    pub max_participants: usize,

    /// Maximum display name length, in characters, after trimming.
    pub max_name_len: usize,

    /// Frames queued per connection. A connection whose queue is full when
    /// a new frame arrives is dropped instead of stalling the lobby.
    pub outbound_capacity: usize,

    /// Commands buffered in front of the lobby task. Callers wait when full.
    pub command_capacity: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_participants: 16,
            max_name_len: 32,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}
