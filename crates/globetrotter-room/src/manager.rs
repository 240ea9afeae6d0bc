//! Room manager: creates, tracks, and routes players to rooms by code.

use std::collections::HashMap;
use std::sync::Arc;

use globetrotter_protocol::{ClientEvent, PlayerId, RoomCode};
use globetrotter_session::Catalog;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Manages all active rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from higher layers
/// (the facade's relay, a server accept loop). Every room it creates
/// shares the same catalog and [`RoomConfig`].
pub struct RoomManager<C: Catalog> {
    catalog: Arc<C>,
    config: RoomConfig,

    /// Active rooms, keyed by code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomCode>,
}

impl<C: Catalog> RoomManager<C> {
    pub fn new(catalog: Arc<C>, config: RoomConfig) -> Self {
        Self {
            catalog,
            config: config.validated(),
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Creates a room under a freshly generated code.
    pub fn create_room(&mut self) -> RoomCode {
        let mut code = RoomCode::generate();
        while self.rooms.contains_key(&code) {
            code = RoomCode::generate();
        }
        self.open_room(code.clone());
        code
    }

    fn open_room(&mut self, code: RoomCode) {
        let handle = spawn_room(
            code.clone(),
            self.config.clone(),
            Arc::clone(&self.catalog),
        );
        tracing::info!(room = %code, "room created");
        self.rooms.insert(code, handle);
    }

    /// Adds a player to an existing room.
    ///
    /// Enforces the "one room at a time" invariant.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        name: &str,
        code: &RoomCode,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.ensure_roomless(player_id, code)?;
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        handle.join(player_id, name, sender).await?;
        self.player_rooms.insert(player_id, code.clone());
        Ok(())
    }

    /// Joins the room named `code`, creating it first if it doesn't
    /// exist. Without a code a new room is created.
    ///
    /// Returns the code of the room joined.
    pub async fn join_or_create(
        &mut self,
        player_id: PlayerId,
        name: &str,
        code: Option<RoomCode>,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        let (code, created) = match code {
            Some(code) => {
                self.ensure_roomless(player_id, &code)?;
                let created = !self.rooms.contains_key(&code);
                if created {
                    self.open_room(code.clone());
                }
                (code, created)
            }
            None => {
                if let Some(current) = self.player_rooms.get(&player_id) {
                    return Err(RoomError::InOtherRoom(player_id, current.clone()));
                }
                (self.create_room(), true)
            }
        };

        if let Err(e) = self.join_room(player_id, name, &code, sender).await {
            if created {
                let _ = self.destroy_room(&code).await;
            }
            return Err(e);
        }
        Ok(code)
    }

    fn ensure_roomless(
        &self,
        player_id: PlayerId,
        code: &RoomCode,
    ) -> Result<(), RoomError> {
        match self.player_rooms.get(&player_id) {
            Some(current) if current == code => {
                Err(RoomError::AlreadyInRoom(player_id, code.clone()))
            }
            Some(current) => Err(RoomError::InOtherRoom(player_id, current.clone())),
            None => Ok(()),
        }
    }

    /// Removes a player from their current room.
    ///
    /// A room left empty is shut down.
    pub async fn leave_room(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .cloned()
            .ok_or(RoomError::NoRoom(player_id))?;

        if let Some(handle) = self.rooms.get(&code) {
            handle.leave(player_id).await?;
        }
        self.player_rooms.remove(&player_id);

        let empty = !self.player_rooms.values().any(|c| *c == code);
        if empty {
            self.destroy_room(&code).await?;
        }
        Ok(())
    }

    /// Routes a round event from a player to their current room.
    pub async fn route_event(
        &self,
        player_id: PlayerId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NoRoom(player_id))?;

        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        handle.send_event(player_id, event).await
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    /// Shuts down a room and removes all its players from the index.
    pub async fn destroy_room(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, c| *c != *code);

        tracing::info!(room = %code, "room destroyed");
        Ok(())
    }

    /// Returns the room code a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(player_id)
    }

    /// Lists rooms that still have space.
    ///
    /// Rooms that fail to respond (e.g., shutting down) are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.get_info().await {
                if info.has_space() {
                    infos.push(info);
                }
            }
        }
        infos
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
}
