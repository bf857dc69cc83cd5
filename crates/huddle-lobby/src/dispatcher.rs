//! Broadcast fan-out: one encode, N bounded per-connection queues.
//!
//! Every live connection owns a bounded queue of encoded frames that its
//! writer task drains onto the socket. The dispatcher only ever pushes with
//! `try_send`, so a connection that stops reading can never stall the lobby
//! task: when its queue is full it is evicted instead. The next roster
//! change sends a full snapshot anyway, so no lobby state is lost for the
//! connections that remain.

use std::collections::BTreeMap;
use std::sync::Arc;

use huddle_protocol::{Codec, LobbyEvent, ProtocolError, Roster};
use huddle_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

/// An encoded frame, shared by every queue it was pushed into.
pub type Frame = Arc<[u8]>;

/// The receiving side of one connection's outbound path.
#[derive(Debug)]
pub struct Subscription {
    /// Frames to write to the socket, in the order they were committed.
    pub frames: mpsc::Receiver<Frame>,

    /// Resolves when the dispatcher lets go of this connection: `Ok(())` on
    /// eviction for falling behind, `Err(_)` when the queue was detached or
    /// the lobby task stopped. Either way the connection should close.
    pub evicted: oneshot::Receiver<()>,
}

/// Sending side kept by the dispatcher for one connection.
#[derive(Debug)]
struct Outbound {
    frames: mpsc::Sender<Frame>,
    evict: oneshot::Sender<()>,
}

/// Fans encoded events out to every attached connection.
pub struct BroadcastDispatcher<C: Codec> {
    codec: C,
    capacity: usize,
    /// Keyed by connection id; `BTreeMap` keeps fan-out order stable.
    outbound: BTreeMap<ConnectionId, Outbound>,
}

impl<C: Codec> BroadcastDispatcher<C> {
    /// Creates a dispatcher whose per-connection queues hold `capacity`
    /// frames.
    pub fn new(codec: C, capacity: usize) -> Self {
        Self {
            codec,
            capacity: capacity.max(1),
            outbound: BTreeMap::new(),
        }
    }

    /// Opens an outbound queue for a connection. Re-attaching an id
    /// replaces (and closes) its previous queue.
    pub fn attach(&mut self, conn_id: ConnectionId) -> Subscription {
        let (frames_tx, frames_rx) = mpsc::channel(self.capacity);
        let (evict_tx, evict_rx) = oneshot::channel();
        self.outbound.insert(
            conn_id,
            Outbound {
                frames: frames_tx,
                evict: evict_tx,
            },
        );
        tracing::debug!(%conn_id, connections = self.outbound.len(), "outbound queue attached");
        Subscription {
            frames: frames_rx,
            evicted: evict_rx,
        }
    }

    /// Closes a connection's queue. Frames already queued are still
    /// delivered by its writer. Returns `false` if it wasn't attached.
    pub fn detach(&mut self, conn_id: ConnectionId) -> bool {
        let removed = self.outbound.remove(&conn_id).is_some();
        if removed {
            tracing::debug!(%conn_id, connections = self.outbound.len(), "outbound queue detached");
        }
        removed
    }

    /// Returns `true` if the connection has a live queue.
    pub fn is_attached(&self, conn_id: ConnectionId) -> bool {
        self.outbound.contains_key(&conn_id)
    }

    /// Number of attached connections.
    pub fn len(&self) -> usize {
        self.outbound.len()
    }

    /// Returns `true` if no connection is attached.
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    /// Encodes `event` and queues it for one connection.
    ///
    /// Returns `Ok(false)` if the connection isn't attached or was evicted
    /// by this push.
    pub fn send_to(
        &mut self,
        conn_id: ConnectionId,
        event: &LobbyEvent,
    ) -> Result<bool, ProtocolError> {
        if !self.is_attached(conn_id) {
            return Ok(false);
        }
        let frame: Frame = self.codec.encode(event)?.into();
        Ok(self.deliver(conn_id, frame))
    }

    /// Encodes `event` once and queues the same bytes for every attached
    /// connection. Returns the connections evicted by this broadcast.
    pub fn broadcast(&mut self, event: &LobbyEvent) -> Result<Vec<ConnectionId>, ProtocolError> {
        let frame: Frame = self.codec.encode(event)?.into();

        let targets: Vec<ConnectionId> = self.outbound.keys().copied().collect();
        let evicted = targets
            .into_iter()
            .filter(|conn_id| !self.deliver(*conn_id, Arc::clone(&frame)))
            .collect();
        Ok(evicted)
    }

    /// Broadcasts `PlayersInLobby` carrying `roster`.
    pub fn broadcast_roster(&mut self, roster: Roster) -> Result<Vec<ConnectionId>, ProtocolError> {
        self.broadcast(&LobbyEvent::PlayersInLobby { players: roster })
    }

    /// Pushes one frame without waiting. Evicts the connection if its queue
    /// is full or its writer is gone; returns whether it is still attached.
    fn deliver(&mut self, conn_id: ConnectionId, frame: Frame) -> bool {
        let Some(outbound) = self.outbound.get(&conn_id) else {
            return false;
        };
        match outbound.frames.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    %conn_id,
                    capacity = self.capacity,
                    "outbound queue full, dropping connection",
                );
                if let Some(outbound) = self.outbound.remove(&conn_id) {
                    let _ = outbound.evict.send(());
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(%conn_id, "writer gone, detaching");
                self.outbound.remove(&conn_id);
                false
            }
        }
    }
}
