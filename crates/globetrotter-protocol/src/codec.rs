//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The room layer never touches bytes. Whoever bridges the event channel
//! picks a [`Codec`]; JSON is the default because browser clients can read
//! it without extra tooling.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because a codec lives as long as the relay and
/// is shared by every participant's task.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`. Behind the `json` feature (default).
///
/// ```rust
/// use globetrotter_protocol::{
///     ClientEvent, Codec, Envelope, JsonCodec, Payload, PlayerId, RoomCode,
/// };
///
/// let codec = JsonCodec;
/// let envelope = Envelope {
///     seq: 1,
///     room: RoomCode::parse("k7q2xz").unwrap(),
///     player: Some(PlayerId(4)),
///     payload: Payload::Event(ClientEvent::NextRound { round: 1 }),
/// };
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
