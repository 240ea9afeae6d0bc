//! Per-participant message routing: bytes in, room operations out.
//!
//! Whatever carries the event channel (a WebSocket, a broadcast bus, a
//! test harness) hands each inbound frame to [`Relay::handle`] along with
//! the participant it came from. The flow is:
//!   1. Decode the frame into an [`Envelope`]
//!   2. Check it may come from this participant
//!   3. Join / Leave / Event → the [`RoomManager`]
//!
//! Failures are both returned and pushed to the participant as a
//! [`ServerEvent::Error`], so a client always learns why nothing happened.

use std::sync::Arc;

use globetrotter_protocol::{
    Codec, Envelope, JsonCodec, Payload, PlayerId, ProtocolError, RoomCode,
    ServerEvent,
};
use globetrotter_room::{PlayerSender, RoomConfig, RoomError, RoomInfo, RoomManager};
use globetrotter_session::Catalog;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::GlobetrotterError;

/// Routes participant envelopes into rooms.
///
/// Shared by every participant's task, so it takes `&self` and keeps the
/// [`RoomManager`] behind a Tokio `Mutex`. The lock is held only while a
/// room command is queued or answered, never while a destination loads.
pub struct Relay<C: Catalog, K: Codec = JsonCodec> {
    rooms: Mutex<RoomManager<C>>,
    codec: K,
}

impl<C: Catalog> Relay<C, JsonCodec> {
    /// A relay speaking JSON.
    pub fn new(catalog: Arc<C>, config: RoomConfig) -> Self {
        Self::with_codec(catalog, config, JsonCodec)
    }
}

impl<C: Catalog, K: Codec> Relay<C, K> {
    pub fn with_codec(catalog: Arc<C>, config: RoomConfig, codec: K) -> Self {
        Self {
            rooms: Mutex::new(RoomManager::new(catalog, config)),
            codec,
        }
    }

    /// Decodes one inbound frame from `player` and acts on it.
    ///
    /// `outbox` is the participant's event channel. Joining registers it
    /// with the room; errors are reported on it.
    pub async fn handle(
        &self,
        player: PlayerId,
        data: &[u8],
        outbox: &PlayerSender,
    ) -> Result<(), GlobetrotterError> {
        let envelope: Envelope = match self.codec.decode(data) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(%player, error = %e, "failed to decode envelope");
                let e = GlobetrotterError::from(e);
                report(outbox, &e);
                return Err(e);
            }
        };
        self.handle_envelope(player, envelope, outbox).await
    }

    /// Acts on an already-decoded envelope from `player`.
    pub async fn handle_envelope(
        &self,
        player: PlayerId,
        envelope: Envelope,
        outbox: &PlayerSender,
    ) -> Result<(), GlobetrotterError> {
        let result = self.route(player, envelope, outbox).await;
        if let Err(e) = &result {
            warn!(%player, error = %e, "rejected participant message");
            report(outbox, e);
        }
        result
    }

    async fn route(
        &self,
        player: PlayerId,
        envelope: Envelope,
        outbox: &PlayerSender,
    ) -> Result<(), GlobetrotterError> {
        // Identity comes from the connection. An envelope may repeat it
        // but never name someone else.
        if let Some(claimed) = envelope.player {
            if claimed != player {
                return Err(ProtocolError::InvalidMessage(format!(
                    "envelope claims {claimed}, sent by {player}"
                ))
                .into());
            }
        }

        let Envelope { seq, room, payload, .. } = envelope;
        match payload {
            Payload::Join { name } => {
                let mut rooms = self.rooms.lock().await;
                let code = rooms
                    .join_or_create(player, &name, Some(room), outbox.clone())
                    .await?;
                info!(%player, room = %code, seq, "participant joined");
            }
            Payload::Leave => {
                let mut rooms = self.rooms.lock().await;
                ensure_in(&rooms, player, &room)?;
                rooms.leave_room(player).await?;
                info!(%player, %room, seq, "participant left");
            }
            Payload::Event(event) => {
                let rooms = self.rooms.lock().await;
                ensure_in(&rooms, player, &room)?;
                debug!(%player, %room, seq, round = event.round(), "routing event");
                rooms.route_event(player, event).await?;
            }
            Payload::Broadcast(_) => {
                return Err(ProtocolError::InvalidMessage(
                    "participants cannot broadcast".into(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Removes `player` from their room after their channel closed.
    ///
    /// A player who was in no room is not an error here.
    pub async fn disconnect(&self, player: PlayerId) -> Result<(), GlobetrotterError> {
        let mut rooms = self.rooms.lock().await;
        match rooms.leave_room(player).await {
            Ok(()) => {
                info!(%player, "participant disconnected");
                Ok(())
            }
            Err(RoomError::NoRoom(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Wraps a room event for the wire.
    pub fn encode_broadcast(
        &self,
        room: &RoomCode,
        seq: u64,
        event: ServerEvent,
    ) -> Result<Vec<u8>, GlobetrotterError> {
        let envelope = Envelope {
            seq,
            room: room.clone(),
            player: None,
            payload: Payload::Broadcast(event),
        };
        Ok(self.codec.encode(&envelope)?)
    }

    /// The room `player` is in, if any.
    pub async fn player_room(&self, player: PlayerId) -> Option<RoomCode> {
        self.rooms.lock().await.player_room(&player).cloned()
    }

    /// Rooms that still have space.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        self.rooms.lock().await.list_rooms().await
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.room_count()
    }

    pub fn codec(&self) -> &K {
        &self.codec
    }
}

/// Rejects a message addressed to a room the player isn't in.
fn ensure_in<C: Catalog>(
    rooms: &RoomManager<C>,
    player: PlayerId,
    room: &RoomCode,
) -> Result<(), RoomError> {
    match rooms.player_room(&player) {
        Some(current) if current == room => Ok(()),
        Some(_) => Err(RoomError::NotInRoom(player, room.clone())),
        None => Err(RoomError::NoRoom(player)),
    }
}

fn report(outbox: &PlayerSender, error: &GlobetrotterError) {
    let _ = outbox.send(ServerEvent::Error {
        code: error.code(),
        message: error.to_string(),
    });
}
