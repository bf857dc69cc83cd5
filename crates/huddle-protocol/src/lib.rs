//! Wire protocol for Huddle.
//!
//! This crate defines the vocabulary that lobby clients and the lobby
//! server share:
//!
//! - **Types** ([`LobbyEvent`], [`Participant`], [`ParticipantId`],
//!   [`Color`], [`Roster`]) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`CborCodec`], [`JsonCodec`]) — how those
//!   events are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (LobbyEvent) → Lobby (roster state)
//! ```
//!
//! The protocol layer knows nothing about connections or the roster's
//! lifecycle; it only knows the shape of each event.

mod codec;
mod error;
mod types;

pub use codec::{CborCodec, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{BoxedCodecError, ProtocolError};
pub use types::{Color, LobbyEvent, Participant, ParticipantId, Roster};
