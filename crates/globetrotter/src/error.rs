//! Unified error type for the Globetrotter crates.

use globetrotter_protocol::ProtocolError;
use globetrotter_room::RoomError;
use globetrotter_round::{InviteError, OptionSetError};
use globetrotter_session::{CatalogError, SessionError};

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attributes let `?` lift a layer's error into this one,
/// so callers of the facade only match on a single type.
#[derive(Debug, thiserror::Error)]
pub enum GlobetrotterError {
    /// Fewer than two distinct names to build an option set from.
    #[error(transparent)]
    Options(#[from] OptionSetError),

    /// A challenge link that couldn't be parsed.
    #[error(transparent)]
    Invite(#[from] InviteError),

    /// Bytes that aren't a valid envelope, or one a participant may not send.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The destination catalog failed or returned unusable data.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A solo session refused the request.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl GlobetrotterError {
    /// Status code reported to a participant in
    /// [`ServerEvent::Error`](globetrotter_protocol::ServerEvent::Error).
    pub fn code(&self) -> u16 {
        match self {
            Self::Room(e) => e.code(),
            Self::Protocol(_) | Self::Invite(_) => 400,
            Self::Catalog(_) => 502,
            Self::Options(_) | Self::Session(_) => 500,
        }
    }
}
