//! Error types for the lobby layer.

use huddle_protocol::ParticipantId;

/// Errors that can occur during lobby operations.
///
/// None of these is fatal to the server: each is reported to (or swallowed
/// on behalf of) the one connection that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The submitted display name was rejected. The roster is unchanged.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The lobby already holds its maximum number of participants.
    #[error("lobby is full ({0} participants)")]
    LobbyFull(usize),

    /// No participant with this id is in the roster (usually because its
    /// connection already closed).
    #[error("participant {0} is not in the lobby")]
    UnknownParticipant(ParticipantId),

    /// The lobby task is gone (server shutting down).
    #[error("lobby is unavailable")]
    Unavailable,
}
