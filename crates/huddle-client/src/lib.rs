//! Participant side of a Huddle lobby.
//!
//! - [`ClientState`]: the synchronous state machine that tracks this
//!   client's id and its cached roster view.
//! - [`LobbyClient`]: that state machine wired to a WebSocket connection.

mod client;
mod error;
mod state;

pub use client::LobbyClient;
pub use error::ClientError;
pub use state::{ClientState, Phase, Readiness, Update};
