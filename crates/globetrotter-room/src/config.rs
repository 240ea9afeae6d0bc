//! Room configuration and lifecycle state.

use globetrotter_round::DEFAULT_OPTION_COUNT;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for a room instance.
///
/// Shared by every room a [`RoomManager`](crate::RoomManager) creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Wrong guesses the room may make on one destination before it is
    /// lost. Refilled every round.
    pub attempts_per_round: u32,

    /// Options shown per round.
    pub option_count: usize,

    /// Capacity of the room's command channel.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 8,
            attempts_per_round: 2,
            option_count: DEFAULT_OPTION_COUNT,
            command_buffer: 64,
        }
    }
}

impl RoomConfig {
    /// Clamps values so a room can always run.
    pub fn validated(mut self) -> Self {
        self.max_players = self.max_players.max(1);
        self.attempts_per_round = self.attempts_per_round.max(1);
        self.option_count = self.option_count.clamp(2, 8);
        self.command_buffer = self.command_buffer.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// Where the room's shared round is.
///
/// ```text
/// Idle ──(first join)──→ Loading ──(ok)──→ InRound ──(resolved)──→ RoundOver
///                          ↑  │                                       │
///                          │  └──(fetch failed)──→ RoundFailed        │
///                          │                            │             │
///                          └────────(NextRound)─────────┴─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Idle,
    Loading,
    InRound,
    RoundOver,
    RoundFailed,
}

impl RoomState {
    /// Returns `true` if a `NextRound` request would be honored.
    pub fn can_advance(&self) -> bool {
        matches!(self, Self::Idle | Self::RoundOver | Self::RoundFailed)
    }

    /// Returns `true` while guesses and lifelines are accepted.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::InRound)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::InRound => write!(f, "InRound"),
            Self::RoundOver => write!(f, "RoundOver"),
            Self::RoundFailed => write!(f, "RoundFailed"),
        }
    }
}
