//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating
/// event-channel messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes were not a valid message: malformed JSON, a missing
    /// field, or an unknown event type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that is empty, too long, or not alphanumeric.
    #[error("invalid room code {0:?}")]
    InvalidRoomCode(String),

    /// The message decoded but breaks a protocol rule, e.g. a participant
    /// sending a server broadcast.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
