//! `HuddleServer` builder and accept loop.
//!
//! This is the entry point for running a lobby server. It ties together
//! the layers: transport → protocol → lobby.

use std::sync::Arc;

use huddle_lobby::{spawn_lobby, LobbyConfig, LobbyHandle};
use huddle_protocol::{CborCodec, Codec};
use huddle_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ConnectionConfig, HuddleError};

/// Port the lobby listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 6942;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: LobbyHandle,
    pub(crate) codec: C,
    pub(crate) connection: ConnectionConfig,
}

/// Builder for configuring and starting a Huddle server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), huddle::HuddleError> {
/// use huddle::prelude::*;
///
/// let server = HuddleServer::builder()
///     .bind("127.0.0.1:6942")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HuddleServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
    connection_config: ConnectionConfig,
}

impl HuddleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            lobby_config: LobbyConfig::default(),
            connection_config: ConnectionConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the lobby configuration.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Sets the per-connection liveness configuration.
    pub fn connection_config(mut self, config: ConnectionConfig) -> Self {
        self.connection_config = config;
        self
    }

    /// Binds the listener and starts the lobby, speaking CBOR.
    pub async fn build(self) -> Result<HuddleServer<CborCodec>, HuddleError> {
        self.build_with_codec(CborCodec).await
    }

    /// Binds the listener and starts the lobby with a custom codec.
    pub async fn build_with_codec<C: Codec + Clone>(
        self,
        codec: C,
    ) -> Result<HuddleServer<C>, HuddleError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            lobby: spawn_lobby(self.lobby_config, codec.clone()),
            codec,
            connection: self.connection_config,
        });

        Ok(HuddleServer { transport, state })
    }
}

impl Default for HuddleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A lobby server bound to its listening address.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HuddleServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl HuddleServer<CborCodec> {
    /// Creates a new builder.
    pub fn builder() -> HuddleServerBuilder {
        HuddleServerBuilder::new()
    }
}

impl<C: Codec> HuddleServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, HuddleError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the lobby this server feeds.
    pub fn lobby(&self) -> LobbyHandle {
        self.state.lobby.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns one handler task per accepted connection. A failing
    /// connection never stops the loop; it runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), HuddleError> {
        tracing::info!("Huddle lobby server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
