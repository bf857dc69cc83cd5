//! Lobby actor: an isolated Tokio task that owns the roster and the
//! broadcast dispatcher.
//!
//! Every mutation arrives as a [`LobbyCommand`] over one mpsc channel and is
//! applied to completion, including queuing the resulting snapshot for
//! every connection, before the next command is looked at. That gives:
//!
//! - atomic roster operations without a lock around the roster,
//! - one roster snapshot per committed change, encoded once,
//! - per-connection delivery in commit order.
//!
//! The task never touches a socket. Writer tasks drain the queues.

use huddle_protocol::{Codec, LobbyEvent, ParticipantId, Roster};
use huddle_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{BroadcastDispatcher, Lobby, LobbyConfig, LobbyError, Subscription};

/// Commands sent to the lobby actor through its channel.
///
/// Variants with a `reply` field are request/response: the caller awaits
/// the `oneshot` for the outcome.
#[derive(Debug)]
enum LobbyCommand {
    /// Open an outbound queue for a new connection.
    Attach {
        conn_id: ConnectionId,
        reply: oneshot::Sender<Subscription>,
    },

    /// Register a participant. On success `YourId` is queued for
    /// `reply_to` (if any) ahead of the roster broadcast.
    AddParticipant {
        name: String,
        reply_to: Option<ConnectionId>,
        reply: oneshot::Sender<Result<ParticipantId, LobbyError>>,
    },

    /// Flip a participant's ready flag.
    ToggleReady {
        id: ParticipantId,
        reply: oneshot::Sender<Result<bool, LobbyError>>,
    },

    /// Remove a participant (idempotent).
    RemoveParticipant {
        id: ParticipantId,
        reply: oneshot::Sender<bool>,
    },

    /// Queue the current roster for one connection only.
    SendRoster { conn_id: ConnectionId },

    /// Return the current roster to the caller.
    Snapshot { reply: oneshot::Sender<Roster> },

    /// Connection closed: drop its queue, then remove its participant.
    Disconnect {
        conn_id: ConnectionId,
        participant: Option<ParticipantId>,
    },
}

/// Handle to the running lobby actor.
///
/// Cheap to clone (it wraps an `mpsc::Sender`); every connection task holds
/// one. The lobby task stops once all handles are dropped.
#[derive(Debug, Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> LobbyCommand,
    ) -> Result<T, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| LobbyError::Unavailable)?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    async fn notify(&self, cmd: LobbyCommand) -> Result<(), LobbyError> {
        self.sender.send(cmd).await.map_err(|_| LobbyError::Unavailable)
    }

    /// Opens the outbound queue for a connection.
    pub async fn attach(&self, conn_id: ConnectionId) -> Result<Subscription, LobbyError> {
        self.request(|reply| LobbyCommand::Attach { conn_id, reply }).await
    }

    /// Registers `name` in the roster without a connection to answer.
    pub async fn add_participant(&self, name: &str) -> Result<ParticipantId, LobbyError> {
        self.register(None, name).await
    }

    /// Registers `name` on behalf of `conn_id`: that connection receives
    /// `YourId` before the roster broadcast that includes it.
    pub async fn register(
        &self,
        reply_to: Option<ConnectionId>,
        name: &str,
    ) -> Result<ParticipantId, LobbyError> {
        let name = name.to_string();
        self.request(|reply| LobbyCommand::AddParticipant {
            name,
            reply_to,
            reply,
        })
        .await?
    }

    /// Flips the participant's ready flag, returning its new value.
    pub async fn toggle_ready(&self, id: ParticipantId) -> Result<bool, LobbyError> {
        self.request(|reply| LobbyCommand::ToggleReady { id, reply }).await?
    }

    /// Removes the participant. Returns `false` if it was already gone.
    pub async fn remove_participant(&self, id: ParticipantId) -> Result<bool, LobbyError> {
        self.request(|reply| LobbyCommand::RemoveParticipant { id, reply }).await
    }

    /// Queues the current roster for `conn_id` through its outbound queue,
    /// behind any broadcast already queued for it.
    pub async fn send_roster(&self, conn_id: ConnectionId) -> Result<(), LobbyError> {
        self.notify(LobbyCommand::SendRoster { conn_id }).await
    }

    /// Returns a copy of the current roster.
    pub async fn snapshot(&self) -> Result<Roster, LobbyError> {
        self.request(|reply| LobbyCommand::Snapshot { reply }).await
    }

    /// Tears down a connection: its queue first, then its participant.
    pub async fn disconnect(
        &self,
        conn_id: ConnectionId,
        participant: Option<ParticipantId>,
    ) -> Result<(), LobbyError> {
        self.notify(LobbyCommand::Disconnect {
            conn_id,
            participant,
        })
        .await
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct LobbyActor<C: Codec> {
    lobby: Lobby,
    dispatcher: BroadcastDispatcher<C>,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl<C: Codec> LobbyActor<C> {
    /// Processes commands until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("lobby actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Attach { conn_id, reply } => {
                    let subscription = self.dispatcher.attach(conn_id);
                    if reply.send(subscription).is_err() {
                        self.dispatcher.detach(conn_id);
                    }
                }
                LobbyCommand::AddParticipant {
                    name,
                    reply_to,
                    reply,
                } => {
                    let result = self.handle_add(&name, reply_to);
                    let _ = reply.send(result);
                }
                LobbyCommand::ToggleReady { id, reply } => {
                    let result = self.lobby.toggle_ready(id);
                    if result.is_ok() {
                        self.broadcast_roster();
                    }
                    let _ = reply.send(result);
                }
                LobbyCommand::RemoveParticipant { id, reply } => {
                    let removed = self.handle_remove(id);
                    let _ = reply.send(removed);
                }
                LobbyCommand::SendRoster { conn_id } => {
                    let event = LobbyEvent::PlayersInLobby {
                        players: self.lobby.snapshot(),
                    };
                    if let Err(e) = self.dispatcher.send_to(conn_id, &event) {
                        tracing::error!(%conn_id, error = %e, "failed to encode roster");
                    }
                }
                LobbyCommand::Snapshot { reply } => {
                    let _ = reply.send(self.lobby.snapshot());
                }
                LobbyCommand::Disconnect {
                    conn_id,
                    participant,
                } => {
                    self.dispatcher.detach(conn_id);
                    if let Some(id) = participant {
                        self.handle_remove(id);
                    }
                }
            }
        }

        tracing::info!("lobby actor stopped");
    }

    fn handle_add(
        &mut self,
        name: &str,
        reply_to: Option<ConnectionId>,
    ) -> Result<ParticipantId, LobbyError> {
        let id = self.lobby.add_participant(name)?;

        if let Some(conn_id) = reply_to {
            if let Err(e) = self.dispatcher.send_to(conn_id, &LobbyEvent::YourId { id }) {
                tracing::error!(%conn_id, error = %e, "failed to encode YourId");
            }
        }
        self.broadcast_roster();
        Ok(id)
    }

    fn handle_remove(&mut self, id: ParticipantId) -> bool {
        let removed = self.lobby.remove_participant(id).is_some();
        if removed {
            self.broadcast_roster();
        } else {
            tracing::debug!(participant_id = %id, "remove of absent participant ignored");
        }
        removed
    }

    /// Queues the post-mutation roster for every connection.
    ///
    /// Evicted connections keep their participant until their own handler
    /// notices the eviction and disconnects.
    fn broadcast_roster(&mut self) {
        match self.dispatcher.broadcast_roster(self.lobby.snapshot()) {
            Ok(evicted) if !evicted.is_empty() => {
                tracing::debug!(count = evicted.len(), "connections evicted during broadcast");
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "failed to encode roster"),
        }
    }
}

/// Spawns the lobby actor and returns a handle to talk to it.
///
/// `config.command_capacity` bounds the command channel: when it is full,
/// callers wait rather than queueing without limit.
pub fn spawn_lobby<C: Codec>(config: LobbyConfig, codec: C) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(config.command_capacity.max(1));

    let actor = LobbyActor {
        dispatcher: BroadcastDispatcher::new(codec, config.outbound_capacity),
        lobby: Lobby::new(config),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    LobbyHandle { sender: tx }
}
