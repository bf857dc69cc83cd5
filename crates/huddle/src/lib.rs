//! # Huddle
//!
//! Real-time pre-game lobby server over WebSocket.
//!
//! Clients connect, register a display name, flip a ready flag, and see
//! every roster change as it happens. The server owns the roster: it hands
//! out ids and colors, and every committed change is pushed to every
//! connected client as a full snapshot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huddle::prelude::*;
//!
//! # async fn run() -> Result<(), HuddleError> {
//! let server = HuddleServer::builder()
//!     .bind("0.0.0.0:6942")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ConnectionConfig;
pub use error::HuddleError;
pub use server::{HuddleServer, HuddleServerBuilder, DEFAULT_PORT};

/// Re-exports everything needed to run a lobby server or talk to one.
pub mod prelude {
    pub use crate::{ConnectionConfig, HuddleError, HuddleServer, HuddleServerBuilder, DEFAULT_PORT};
    pub use huddle_lobby::{LobbyConfig, LobbyError, LobbyHandle};
    pub use huddle_protocol::{
        CborCodec, Codec, Color, LobbyEvent, Participant, ParticipantId, ProtocolError, Roster,
    };
    pub use huddle_transport::{ConnectionId, TransportError};
}
