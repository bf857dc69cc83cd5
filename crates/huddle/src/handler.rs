//! Per-connection handler: registration, event routing, liveness.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbound queue. The flow:
//!   1. Attach an outbound queue at the lobby, start the writer
//!   2. Loop: receive frames → decode → route to the lobby
//!   3. On close, timeout, or eviction: detach and remove the participant
//!
//! A connection is anonymous until a `NewPlayer` succeeds; from then on it
//! is bound to exactly one participant id for the rest of its life.

use std::sync::Arc;

use huddle_lobby::{Frame, LobbyError, LobbyHandle, Subscription};
use huddle_protocol::{Codec, LobbyEvent, ParticipantId};
use huddle_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::server::ServerState;
use crate::HuddleError;

/// Drop guard that takes the connection out of the lobby when the handler
/// exits, however it exits.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async send.
struct ConnectionGuard {
    conn_id: ConnectionId,
    /// The participant this connection registered, once it has.
    participant: Option<ParticipantId>,
    lobby: LobbyHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let participant = self.participant;
        let lobby = self.lobby.clone();
        tokio::spawn(async move {
            let _ = lobby.disconnect(conn_id, participant).await;
        });
    }
}

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    ClosedByPeer,
    ReadFailed,
    IdleTimeout,
    Evicted,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), HuddleError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let Subscription {
        frames,
        mut evicted,
    } = state.lobby.attach(conn_id).await?;

    let mut guard = ConnectionGuard {
        conn_id,
        participant: None,
        lobby: state.lobby.clone(),
    };

    let writer = tokio::spawn(write_frames(Arc::clone(&conn), frames));

    let mut keepalive = tokio::time::interval(state.connection.keepalive_interval);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    keepalive.tick().await;

    let reason = loop {
        tokio::select! {
            received = conn.recv() => match received {
                Ok(Some(data)) => {
                    handle_frame(&state, &mut guard, &data).await?;
                }
                Ok(None) => break CloseReason::ClosedByPeer,
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break CloseReason::ReadFailed;
                }
            },
            _ = keepalive.tick() => {
                if conn.idle_for() > state.connection.idle_timeout {
                    break CloseReason::IdleTimeout;
                }
                let ping = tokio::time::timeout(
                    state.connection.keepalive_interval,
                    conn.ping(),
                )
                .await;
                if !matches!(ping, Ok(Ok(()))) {
                    break CloseReason::ReadFailed;
                }
            }
            _ = &mut evicted => break CloseReason::Evicted,
        }
    };

    match reason {
        CloseReason::ClosedByPeer => {
            tracing::info!(%conn_id, participant_id = ?guard.participant, "connection closed");
        }
        CloseReason::Evicted => {
            tracing::warn!(
                %conn_id,
                participant_id = ?guard.participant,
                "connection dropped for falling behind",
            );
            writer.abort();
        }
        other => {
            tracing::info!(
                %conn_id,
                participant_id = ?guard.participant,
                reason = ?other,
                "connection lost",
            );
            writer.abort();
        }
    }

    // guard drops here → disconnect reaches the lobby, which detaches the
    // queue; the writer then drains what is left and closes the socket.
    Ok(())
}

/// Decodes one inbound frame and applies it.
///
/// Only a lobby that has gone away is an error here; everything a single
/// client can get wrong is logged and dropped.
async fn handle_frame<C: Codec>(
    state: &ServerState<C>,
    guard: &mut ConnectionGuard,
    data: &[u8],
) -> Result<(), HuddleError> {
    let conn_id = guard.conn_id;

    let event: LobbyEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "dropping undecodable frame");
            return Ok(());
        }
    };

    match event {
        LobbyEvent::NewPlayer { name } => {
            if let Some(id) = guard.participant {
                tracing::debug!(
                    %conn_id,
                    participant_id = %id,
                    "already registered, ignoring NewPlayer",
                );
                return Ok(());
            }
            match state.lobby.register(Some(conn_id), &name).await {
                Ok(id) => {
                    guard.participant = Some(id);
                    tracing::info!(%conn_id, participant_id = %id, "connection registered");
                }
                Err(LobbyError::Unavailable) => return Err(LobbyError::Unavailable.into()),
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "registration rejected");
                }
            }
        }

        LobbyEvent::ToggleReady => {
            let Some(id) = guard.participant else {
                tracing::debug!(%conn_id, "ToggleReady before NewPlayer, ignoring");
                return Ok(());
            };
            match state.lobby.toggle_ready(id).await {
                Ok(_) => {}
                Err(LobbyError::Unavailable) => return Err(LobbyError::Unavailable.into()),
                Err(e) => tracing::debug!(%conn_id, error = %e, "toggle ignored"),
            }
        }

        LobbyEvent::GetPlayersInLobby => {
            state.lobby.send_roster(conn_id).await?;
        }

        other @ (LobbyEvent::YourId { .. } | LobbyEvent::PlayersInLobby { .. }) => {
            tracing::debug!(%conn_id, tag = other.tag(), "ignoring server-only event from client");
        }

        LobbyEvent::Unknown => {
            tracing::debug!(%conn_id, "ignoring unknown event");
        }
    }

    Ok(())
}

/// Drains the outbound queue onto the socket, then closes it.
///
/// Ends when the lobby detaches the queue or a write fails.
async fn write_frames(conn: Arc<WebSocketConnection>, mut frames: mpsc::Receiver<Frame>) {
    let conn_id = conn.id();
    while let Some(frame) = frames.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%conn_id, error = %e, "write failed");
            return;
        }
    }
    let _ = conn.close().await;
}
