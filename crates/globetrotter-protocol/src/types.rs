//! Message types that travel over the room event channel.
//!
//! Two directions:
//!
//! - participant → room: [`Payload::Join`], [`Payload::Leave`], and
//!   [`Payload::Event`] wrapping a [`ClientEvent`];
//! - room → participants: [`Payload::Broadcast`] wrapping a
//!   [`ServerEvent`].
//!
//! Every [`ClientEvent`] names the round it refers to. The room drops
//! events aimed at a round that is no longer current, which is how a late
//! click never lands on the wrong destination.

use std::fmt;

use globetrotter_round::{
    DestinationId, Feedback, Hint, Invitation, LifelineKind, OptionSet,
    RoundPhase, SessionScore,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a room participant.
///
/// Newtype over `u64`, serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The human-shareable name of a room, e.g. `K7Q2XZ`.
///
/// Codes are case-insensitive for people typing them and stored
/// uppercase. Deserializing runs the same validation as
/// [`RoomCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Length of generated codes.
    pub const GENERATED_LEN: usize = 6;

    /// Longest code a player may type.
    pub const MAX_LEN: usize = 12;

    const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Normalizes and validates a typed room code.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidRoomCode`] if the trimmed code is empty,
    /// longer than [`Self::MAX_LEN`], or has non-alphanumeric characters.
    pub fn parse(code: &str) -> Result<Self, ProtocolError> {
        let code = code.trim().to_ascii_uppercase();
        let valid = !code.is_empty()
            && code.len() <= Self::MAX_LEN
            && code.bytes().all(|b| b.is_ascii_alphanumeric());
        if valid {
            Ok(Self(code))
        } else {
            Err(ProtocolError::InvalidRoomCode(code))
        }
    }

    /// Generates a random code of [`Self::GENERATED_LEN`] characters.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..Self::GENERATED_LEN)
            .map(|_| {
                let i = rng.random_range(0..Self::ALPHABET.len());
                char::from(Self::ALPHABET[i])
            })
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::parse(&code)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who a [`ServerEvent`] is for.
///
/// Room rules return `(Recipient, ServerEvent)` pairs and the room actor
/// fans them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One player: lifeline results, welcome messages, errors.
    Player(PlayerId),
    /// Everyone but one player.
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Shared views
// ---------------------------------------------------------------------------

/// A participant as shown in the player list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// What participants see of a round. The answer is not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    /// Round generation. Client events must echo it back.
    pub round: u64,
    pub destination: DestinationId,
    pub clues: Vec<String>,
    pub options: OptionSet,
    pub attempts_left: u32,
}

// ---------------------------------------------------------------------------
// ClientEvent / ServerEvent
// ---------------------------------------------------------------------------

/// Participant → room: actions on the shared round.
///
/// Internally tagged: `{ "type": "Guess", "round": 3, "option": "Paris" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Pick an option.
    Guess { round: u64, option: String },

    /// Spend one of the participant's lifelines on the current round.
    UseLifeline { round: u64, lifeline: LifelineKind },

    /// Ask the room to move on from a resolved round.
    NextRound { round: u64 },
}

impl ClientEvent {
    /// The round generation this event targets.
    pub fn round(&self) -> u64 {
        match self {
            Self::Guess { round, .. }
            | Self::UseLifeline { round, .. }
            | Self::NextRound { round } => *round,
        }
    }
}

/// Room → participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Sent to a player right after they join.
    Welcome { room: RoomCode, player: PlayerId },

    /// Full room state, sent to a player after they join.
    Snapshot {
        players: Vec<PlayerInfo>,
        score: SessionScore,
        round: Option<RoundView>,
        phase: Option<RoundPhase>,
    },

    PlayerJoined { player: PlayerInfo },

    PlayerLeft { player: PlayerId },

    /// Player list and room score after anything that changed them.
    Scoreboard {
        players: Vec<PlayerInfo>,
        score: SessionScore,
    },

    /// A destination fetch for round `round` is in flight.
    RoundLoading { round: u64 },

    /// A new round is ready.
    RoundStarted { view: RoundView },

    /// The fetch for round `round` failed. Any participant may ask for
    /// the next round again.
    RoundFailed { round: u64, reason: String },

    /// The authoritative outcome of one guess.
    GuessResolved {
        round: u64,
        player: PlayerId,
        phase: RoundPhase,
        feedback: Feedback,
    },

    /// The requesting player's 50:50 result.
    OptionsNarrowed { round: u64, options: OptionSet },

    /// The requesting player's hint.
    HintRevealed { round: u64, hint: Hint },

    /// The requesting player's challenge link data.
    ChallengeReady { round: u64, invitation: Invitation },

    /// Something the room refused, with an HTTP-style code.
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// The content of an [`Envelope`].
///
/// Adjacently tagged: `{ "type": "Event", "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    /// Enter the envelope's room under a display name. The room is created
    /// if it doesn't exist yet.
    Join { name: String },

    /// Leave the envelope's room.
    Leave,

    /// An action on the shared round.
    Event(ClientEvent),

    /// A room broadcast.
    Broadcast(ServerEvent),
}

/// The top-level message on the event channel.
///
/// ```text
/// ┌──────────────────────────────────┐
/// │ seq: 12                          │  ← per-sender ordering
/// │ room: K7Q2XZ                     │  ← which room
/// │ player: Some(P-4)                │  ← who, when it matters
/// │ ┌──────────────────────────────┐ │
/// │ │ payload: Event(Guess {..})   │ │
/// │ └──────────────────────────────┘ │
/// └──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,
    pub room: RoomCode,
    #[serde(default)]
    pub player: Option<PlayerId>,
    pub payload: Payload,
}

// =========================================================================
// Tests
// =========================================================================
