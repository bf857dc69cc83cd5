//! The authoritative lobby for Huddle.
//!
//! One lobby task owns the roster ([`Lobby`]) and the broadcast fan-out
//! ([`BroadcastDispatcher`]); everything else talks to it through a
//! [`LobbyHandle`]. Control flows in through the handle, state flows out
//! through each connection's [`Subscription`]:
//!
//! ```text
//! connection tasks ──commands──→ lobby task ──frames──→ per-connection queues
//! ```
//!
//! # Key types
//!
//! - [`Lobby`] — the roster store (synchronous, single owner)
//! - [`BroadcastDispatcher`] — encode-once fan-out with bounded queues
//! - [`LobbyHandle`] / [`spawn_lobby`] — the actor that serializes access
//! - [`LobbyConfig`] — capacity and queue settings

mod config;
mod dispatcher;
mod error;
mod handle;
mod store;

pub use config::{LobbyConfig, DEFAULT_COMMAND_CAPACITY, DEFAULT_OUTBOUND_CAPACITY};
pub use dispatcher::{BroadcastDispatcher, Frame, Subscription};
pub use error::LobbyError;
pub use handle::{spawn_lobby, LobbyHandle};
pub use store::Lobby;
