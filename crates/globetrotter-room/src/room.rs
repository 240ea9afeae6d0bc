//! Room actor: an isolated Tokio task that owns a [`RoomGame`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. No shared mutable state, just message passing.
//!
//! Destination fetches are the one slow thing a room does. They run in a
//! separate task and come back through the same channel as
//! [`RoomCommand::RoundLoaded`], tagged with the generation they were
//! started for, so the actor loop never waits on the catalog.

use std::collections::HashMap;
use std::sync::Arc;

use globetrotter_protocol::{
    ClientEvent, PlayerId, Recipient, RoomCode, ServerEvent,
};
use globetrotter_session::{
    Catalog, CatalogError, FetchedDestination, fetch_destination,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::logic::Step;
use crate::{RoomConfig, RoomError, RoomGame, RoomState};

/// Channel sender for delivering room events to a player.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    /// Add a player to the room.
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a player from the room.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Deliver a round event from a player.
    Event {
        sender: PlayerId,
        event: ClientEvent,
    },

    /// A destination fetch finished.
    RoundLoaded {
        generation: u64,
        result: Result<FetchedDestination, CatalogError>,
    },

    /// Request the current room info.
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub state: RoomState,
    /// Current round generation.
    pub round: u64,
    pub player_count: usize,
    pub max_players: usize,
}

impl RoomInfo {
    pub fn has_space(&self) -> bool {
        self.player_count < self.max_players
    }
}

/// Handle to a running room actor.
///
/// Cheap to clone; it's just an `mpsc::Sender` wrapper.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    /// Sends a join request to the room.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                name: name.into(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a leave request to the room.
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a round event to the room (fire-and-forget).
    pub async fn send_event(
        &self,
        sender: PlayerId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Event { sender, event })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<C: Catalog> {
    game: RoomGame,
    catalog: Arc<C>,
    rng: StdRng,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Lets fetch tasks report back without keeping the room alive.
    loopback: mpsc::WeakSender<RoomCommand>,
}

impl<C: Catalog> RoomActor<C> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.game.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, &name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Event { sender, event } => {
                    let step = self.game.handle_event(sender, event, &mut self.rng);
                    self.apply(step);
                }
                RoomCommand::RoundLoaded { generation, result } => {
                    let step =
                        self.game.round_loaded(generation, result, &mut self.rng);
                    self.apply(step);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.game.code(), "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.game.code(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let step = self.game.add_player(player_id, name)?;
        self.senders.insert(player_id, sender);
        self.apply(step);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let step = self.game.remove_player(player_id)?;
        self.senders.remove(&player_id);
        self.apply(step);
        Ok(())
    }

    /// Delivers a step's events and starts its fetch, if any.
    fn apply(&self, step: Step) {
        if let Some(generation) = step.fetch {
            self.spawn_fetch(generation);
        }
        self.dispatch(step.events);
    }

    fn spawn_fetch(&self, generation: u64) {
        let Some(loopback) = self.loopback.upgrade() else {
            return;
        };
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            let result = fetch_destination(catalog.as_ref()).await;
            // The room may be gone by now; that's fine.
            let _ = loopback
                .send(RoomCommand::RoundLoaded { generation, result })
                .await;
        });
    }

    /// Dispatches events to the correct recipients.
    fn dispatch(&self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for pid in self.senders.keys() {
                        self.send_to(*pid, event.clone());
                    }
                }
                Recipient::Player(pid) => {
                    self.send_to(pid, event);
                }
                Recipient::AllExcept(excluded) => {
                    for pid in self.senders.keys() {
                        if *pid != excluded {
                            self.send_to(*pid, event.clone());
                        }
                    }
                }
            }
        }
    }

    /// Sends an event to a single player. Silently drops it if the
    /// receiver is gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.game.code().clone(),
            state: self.game.state(),
            round: self.game.generation(),
            player_count: self.game.player_count(),
            max_players: self.game.config().max_players,
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room<C: Catalog>(
    code: RoomCode,
    config: RoomConfig,
    catalog: Arc<C>,
) -> RoomHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let actor = RoomActor {
        game: RoomGame::new(code.clone(), config),
        catalog,
        rng: StdRng::from_os_rng(),
        senders: HashMap::new(),
        receiver: rx,
        loopback: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
