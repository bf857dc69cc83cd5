//! Error types for the client.

use huddle_protocol::ProtocolError;
use huddle_transport::TransportError;

use crate::Phase;

/// Errors a lobby client can run into.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The display name was empty or only whitespace. Nothing was sent.
    #[error("display name must not be empty")]
    EmptyName,

    /// The action isn't allowed in the client's current phase.
    #[error("cannot {action} while {phase:?}")]
    InvalidPhase { action: &'static str, phase: Phase },

    /// The client was closed; no further events are processed.
    #[error("client is closed")]
    Closed,

    /// The connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An outgoing event could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
