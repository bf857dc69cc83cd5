//! The participant-side mirror of the lobby.
//!
//! [`ClientState`] is a synchronous state machine. It never does I/O: the
//! methods that start an action return the [`LobbyEvent`] to send, and
//! [`on_event`](ClientState::on_event) folds in whatever the server sends
//! back.
//!
//! ```text
//!   Unregistered ──register──→ AwaitingId ──YourId──→ InLobby
//!        │                       ↺ register              │
//!        │                          │                    │
//!        └──────────── close ───────┴────────────────────┴──→ Closed
//! ```
//!
//! The cached roster is replaced wholesale on every `PlayersInLobby`, never
//! merged. Toggling ready doesn't touch the cache either: the change shows
//! up when the server's next snapshot does.

use huddle_protocol::{LobbyEvent, Participant, ParticipantId, Roster};

use crate::ClientError;

/// Where the client is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connected, no `NewPlayer` sent yet.
    Unregistered,
    /// `NewPlayer` sent, waiting for `YourId`.
    AwaitingId,
    /// Holding a server-assigned id.
    InLobby,
    /// Torn down. Terminal.
    Closed,
}

/// Own ready flag, as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

/// What an inbound event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// `YourId` arrived; the client is now in the lobby.
    Registered(ParticipantId),
    /// The cached roster was replaced.
    Roster,
    /// Nothing changed.
    Ignored,
}

/// Local identity plus the cached roster view.
#[derive(Debug, Clone)]
pub struct ClientState {
    phase: Phase,
    id: Option<ParticipantId>,
    roster: Roster,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Unregistered,
            id: None,
            roster: Roster::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The id assigned by the server, once `YourId` has arrived.
    pub fn id(&self) -> Option<ParticipantId> {
        self.id
    }

    /// The last roster snapshot received, in server order.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// This client's own entry in the cached roster.
    pub fn me(&self) -> Option<&Participant> {
        let id = self.id?;
        self.roster.iter().find(|p| p.id == id)
    }

    /// Own readiness, derived from the cached roster. `None` until a
    /// snapshot containing this client's id has arrived.
    pub fn readiness(&self) -> Option<Readiness> {
        self.me().map(|p| {
            if p.ready {
                Readiness::Ready
            } else {
                Readiness::NotReady
            }
        })
    }

    /// Starts registration under `name` and returns the event to send.
    ///
    /// Empty names are rejected here without a round trip, since the server
    /// would drop them silently. The server also drops names it considers
    /// too long, and every name once the lobby is full, without a reply, so
    /// registering again while still awaiting an id is allowed: it simply
    /// sends another `NewPlayer`.
    pub fn register(&mut self, name: &str) -> Result<LobbyEvent, ClientError> {
        match self.phase {
            Phase::Unregistered | Phase::AwaitingId => {}
            Phase::Closed => return Err(ClientError::Closed),
            phase => {
                return Err(ClientError::InvalidPhase {
                    action: "register",
                    phase,
                });
            }
        }
        if name.trim().is_empty() {
            return Err(ClientError::EmptyName);
        }
        self.phase = Phase::AwaitingId;
        Ok(LobbyEvent::NewPlayer {
            name: name.to_string(),
        })
    }

    /// Returns the `ToggleReady` event to send. Only valid in the lobby.
    pub fn toggle_ready(&self) -> Result<LobbyEvent, ClientError> {
        self.require(Phase::InLobby, "toggle ready")?;
        Ok(LobbyEvent::ToggleReady)
    }

    /// Returns the `GetPlayersInLobby` event to send.
    pub fn request_roster(&self) -> Result<LobbyEvent, ClientError> {
        if self.phase == Phase::Closed {
            return Err(ClientError::Closed);
        }
        Ok(LobbyEvent::GetPlayersInLobby)
    }

    /// Applies one event from the server.
    pub fn on_event(&mut self, event: LobbyEvent) -> Update {
        if self.phase == Phase::Closed {
            return Update::Ignored;
        }

        match event {
            LobbyEvent::YourId { id } if self.phase == Phase::AwaitingId => {
                self.id = Some(id);
                self.phase = Phase::InLobby;
                Update::Registered(id)
            }
            LobbyEvent::YourId { id } => {
                tracing::debug!(
                    participant_id = %id,
                    phase = ?self.phase,
                    "unexpected YourId ignored",
                );
                Update::Ignored
            }
            LobbyEvent::PlayersInLobby { players } => {
                self.roster = players;
                Update::Roster
            }
            other => {
                tracing::debug!(tag = other.tag(), "ignoring non-server event");
                Update::Ignored
            }
        }
    }

    /// Tears the state down. Later events are ignored.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.roster.clear();
    }

    fn require(&self, expected: Phase, action: &'static str) -> Result<(), ClientError> {
        match self.phase {
            Phase::Closed => Err(ClientError::Closed),
            phase if phase == expected => Ok(()),
            phase => Err(ClientError::InvalidPhase { action, phase }),
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
