//! Event-channel protocol for Globetrotter rooms.
//!
//! The transport that keeps room participants in sync is somebody else's
//! problem. This crate only fixes what travels over it:
//!
//! - **Types** ([`Envelope`], [`Payload`], [`ClientEvent`],
//!   [`ServerEvent`]): every message is attributable to a room
//!   ([`RoomCode`]) and, where it matters, to a player ([`PlayerId`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Event channel (bytes) → Protocol (Envelope) → Room actor (shared round)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, Envelope, Payload, PlayerId, PlayerInfo, Recipient,
    RoomCode, RoundView, ServerEvent,
};
