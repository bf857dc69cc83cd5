//! Core protocol types for Huddle's wire format.
//!
//! Every type in this module travels "on the wire": it is serialized into a
//! frame, sent over the connection, and deserialized on the other side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A server-assigned identifier for a lobby participant.
///
/// Ids come from a per-lobby counter and are never reused while the lobby
/// lives. On the wire an id is a text string (`"3"`), which is what clients
/// store and compare against roster entries.
///
/// The string must hold a decimal `u64`. Peers that issue other id shapes
/// (UUIDs, for instance) are not wire-compatible: a `YourId` or roster
/// entry carrying one fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ParticipantId)
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e| {
            serde::de::Error::custom(format!("invalid participant id {raw:?}: {e}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Participant & roster
// ---------------------------------------------------------------------------

/// Display color of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// The fixed palette, in assignment order.
    pub const PALETTE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
        };
        f.write_str(name)
    }
}

/// One entry of the lobby roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name as submitted by the client, trimmed.
    pub name: String,
    pub color: Color,
    pub ready: bool,
}

/// The ordered list of participants. Order is join order and is preserved
/// verbatim in every snapshot.
pub type Roster = Vec<Participant>;

// ---------------------------------------------------------------------------
// LobbyEvent — the envelope
// ---------------------------------------------------------------------------

/// One protocol event. Every frame carries exactly one.
///
/// `#[serde(tag = "event_type")]` produces an internally tagged map, the
/// tag sitting next to the variant's own fields:
///
/// ```text
/// { "event_type": "NewPlayer", "name": "Alice" }
/// { "event_type": "ToggleReady" }
/// { "event_type": "PlayersInLobby", "players": [ { "id": "1", ... } ] }
/// ```
///
/// Keys a variant doesn't know are skipped on decode. A tag this version
/// doesn't know decodes to [`LobbyEvent::Unknown`] instead of failing, so
/// newer peers degrade gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum LobbyEvent {
    // -- Client → Server --

    /// "Register me under this display name."
    NewPlayer { name: String },

    /// "Flip my ready flag."
    ToggleReady,

    /// "Send me the current roster."
    GetPlayersInLobby,

    // -- Server → Client --

    /// Unicast reply to a successful `NewPlayer`.
    YourId { id: ParticipantId },

    /// Full roster snapshot; broadcast after every roster change and sent
    /// in reply to `GetPlayersInLobby`.
    PlayersInLobby { players: Roster },

    /// Any tag not listed above.
    #[serde(other)]
    Unknown,
}

impl LobbyEvent {
    /// The wire tag of this event, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            LobbyEvent::NewPlayer { .. } => "NewPlayer",
            LobbyEvent::ToggleReady => "ToggleReady",
            LobbyEvent::GetPlayersInLobby => "GetPlayersInLobby",
            LobbyEvent::YourId { .. } => "YourId",
            LobbyEvent::PlayersInLobby { .. } => "PlayersInLobby",
            LobbyEvent::Unknown => "Unknown",
        }
    }

    /// Returns `true` for the events a client sends to the server.
    pub fn is_client_event(&self) -> bool {
        matches!(
            self,
            LobbyEvent::NewPlayer { .. }
                | LobbyEvent::ToggleReady
                | LobbyEvent::GetPlayersInLobby
        )
    }
}

// =========================================================================
// Tests
// =========================================================================
