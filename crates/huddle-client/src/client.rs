//! `LobbyClient`: a [`ClientState`] driven by one WebSocket connection.

use huddle_protocol::{CborCodec, Codec, LobbyEvent};
use huddle_transport::{connect, ClientConnection, Connection};

use crate::{ClientError, ClientState, Phase, Update};

/// A connected lobby participant.
///
/// Outgoing actions go through the state machine first, so an action that
/// isn't valid right now fails locally and nothing is sent.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), huddle_client::ClientError> {
/// use huddle_client::{LobbyClient, Update};
///
/// let mut client = LobbyClient::connect("ws://127.0.0.1:6942").await?;
/// client.register("Alice").await?;
/// while let Some(update) = client.next_update().await? {
///     if update == Update::Roster {
///         println!("{} in lobby", client.state().roster().len());
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct LobbyClient<C: Codec = CborCodec> {
    conn: ClientConnection,
    codec: C,
    state: ClientState,
}

impl LobbyClient<CborCodec> {
    /// Connects to a lobby server speaking CBOR.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        Self::connect_with_codec(url, CborCodec).await
    }
}

impl<C: Codec> LobbyClient<C> {
    /// Connects to a lobby server speaking the given codec.
    pub async fn connect_with_codec(url: &str, codec: C) -> Result<Self, ClientError> {
        let conn = connect(url).await?;
        tracing::info!(url, conn_id = %conn.id(), "connected to lobby");
        Ok(Self {
            conn,
            codec,
            state: ClientState::new(),
        })
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Sends `NewPlayer`. The id arrives later through
    /// [`next_update`](Self::next_update).
    pub async fn register(&mut self, name: &str) -> Result<(), ClientError> {
        let event = self.state.register(name)?;
        self.send(&event).await
    }

    /// Sends `ToggleReady`. The new flag shows up with the next roster.
    pub async fn toggle_ready(&mut self) -> Result<(), ClientError> {
        let event = self.state.toggle_ready()?;
        self.send(&event).await
    }

    /// Asks the server for a fresh roster snapshot.
    pub async fn request_roster(&mut self) -> Result<(), ClientError> {
        let event = self.state.request_roster()?;
        self.send(&event).await
    }

    /// Waits for the next frame from the server and applies it.
    ///
    /// Frames that don't decode are logged and skipped. Returns `Ok(None)`
    /// once the connection is closed, by either side.
    pub async fn next_update(&mut self) -> Result<Option<Update>, ClientError> {
        loop {
            if self.state.phase() == Phase::Closed {
                return Ok(None);
            }
            let Some(data) = self.conn.recv().await? else {
                tracing::info!(conn_id = %self.conn.id(), "lobby closed the connection");
                self.state.close();
                return Ok(None);
            };
            match self.codec.decode::<LobbyEvent>(&data) {
                Ok(event) => return Ok(Some(self.state.on_event(event))),
                Err(e) => {
                    tracing::debug!(error = %e, len = data.len(), "skipping undecodable frame");
                }
            }
        }
    }

    /// Leaves the lobby by closing the connection.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        if self.state.phase() == Phase::Closed {
            return Ok(());
        }
        self.state.close();
        self.conn.close().await?;
        Ok(())
    }

    async fn send(&self, event: &LobbyEvent) -> Result<(), ClientError> {
        let bytes = self.codec.encode(event)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }
}
