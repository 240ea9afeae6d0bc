//! Error types for the room layer.

use globetrotter_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// No more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The player is already in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// The player is already in a different room.
    #[error("player {0} is already in room {1}")]
    InOtherRoom(PlayerId, RoomCode),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomCode),

    /// The player is not in any room.
    #[error("player {0} is not in any room")]
    NoRoom(PlayerId),

    /// Display names must have at least one visible character.
    #[error("player name must not be blank")]
    BlankName,

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// HTTP-style status for [`ServerEvent::Error`](globetrotter_protocol::ServerEvent::Error).
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::NoRoom(_) => 404,
            Self::RoomFull(_) => 403,
            Self::AlreadyInRoom(..) | Self::InOtherRoom(..) => 409,
            Self::NotInRoom(..) => 403,
            Self::BlankName => 400,
            Self::Unavailable(_) => 503,
        }
    }
}
