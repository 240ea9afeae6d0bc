//! The lifeline engine: one-time aids a player can spend on a round.
//!
//! Three kinds exist:
//!
//! - **Narrow the field** (50:50): cut the options down to the answer
//!   plus one wrong name.
//! - **Reveal a hint**: show a true property of the answer that is not
//!   the answer itself.
//! - **Challenge a friend**: produce a share intent for the outside
//!   share collaborator. No effect on the round.
//!
//! Every lifeline is guarded the same way: it must still be available AND
//! the round must not have seen a guess yet. Once a round has feedback,
//! even a retryable miss, lifelines stay shut until the next round. A
//! guarded-out call is a silent no-op. It returns `None` and leaves every
//! flag untouched.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Destination, Invitation, OptionSet, RoundPhase, ShareIntent};

// ---------------------------------------------------------------------------
// LifelineKind / LifelineScope
// ---------------------------------------------------------------------------

/// Which lifeline is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifelineKind {
    NarrowField,
    RevealHint,
    ChallengeFriend,
}

impl LifelineKind {
    pub const ALL: [LifelineKind; 3] = [
        LifelineKind::NarrowField,
        LifelineKind::RevealHint,
        LifelineKind::ChallengeFriend,
    ];
}

impl fmt::Display for LifelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NarrowField => write!(f, "50:50"),
            Self::RevealHint => write!(f, "hint"),
            Self::ChallengeFriend => write!(f, "challenge a friend"),
        }
    }
}

/// How long a set of lifelines lasts before it is refilled.
///
/// Solo play keeps lifelines for the whole run; rooms refill them every
/// time a new destination loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifelineScope {
    /// Refilled only on "start over".
    #[default]
    PerSession,
    /// Refilled whenever a new round starts.
    PerRound,
}

// ---------------------------------------------------------------------------
// Hint
// ---------------------------------------------------------------------------

/// A revealed property of the answer.
///
/// Derived deterministically from the destination name. A one-letter name
/// would be given away by its first letter, so those reveal the length
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Hint {
    StartsWith { letter: char },
    LetterCount { letters: usize },
}

impl Hint {
    pub fn for_destination(destination: &Destination) -> Self {
        let name = destination.name.trim();
        let letters = name.chars().count();
        match name.chars().next() {
            Some(letter) if letters > 1 => Self::StartsWith { letter },
            _ => Self::LetterCount { letters },
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartsWith { letter } => {
                write!(f, "The answer starts with \"{letter}\"")
            }
            Self::LetterCount { letters: 1 } => {
                write!(f, "The answer has 1 letter")
            }
            Self::LetterCount { letters } => {
                write!(f, "The answer has {letters} letters")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Lifelines
// ---------------------------------------------------------------------------

/// Availability flags for the three lifelines.
///
/// A flag flips from available to used at most once, and only
/// [`reset`](Self::reset) flips it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifelines {
    narrow_field: bool,
    reveal_hint: bool,
    challenge_friend: bool,
}

impl Default for Lifelines {
    fn default() -> Self {
        Self {
            narrow_field: true,
            reveal_hint: true,
            challenge_friend: true,
        }
    }
}

impl Lifelines {
    /// All three lifelines available.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_available(&self, kind: LifelineKind) -> bool {
        *self.flag(kind)
    }

    /// Lifelines that can still be spent.
    pub fn available(&self) -> Vec<LifelineKind> {
        LifelineKind::ALL
            .into_iter()
            .filter(|kind| self.is_available(*kind))
            .collect()
    }

    /// Makes every lifeline available again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Spends the 50:50 lifeline.
    ///
    /// Returns a two-name set holding the answer and one random wrong name
    /// from `current`, in a fresh order.
    pub fn apply_narrow_field(
        &mut self,
        phase: RoundPhase,
        current: &OptionSet,
        target: &Destination,
        rng: &mut impl Rng,
    ) -> Option<OptionSet> {
        if !self.usable(LifelineKind::NarrowField, phase) {
            return None;
        }
        let narrowed = current.narrowed(&target.name, rng)?;
        self.narrow_field = false;
        Some(narrowed)
    }

    /// Spends the hint lifeline.
    pub fn apply_reveal_hint(
        &mut self,
        phase: RoundPhase,
        target: &Destination,
    ) -> Option<Hint> {
        if !self.usable(LifelineKind::RevealHint, phase) {
            return None;
        }
        self.reveal_hint = false;
        Some(Hint::for_destination(target))
    }

    /// Spends the challenge lifeline, wrapping `invitation` for the share
    /// collaborator.
    pub fn apply_challenge_friend(
        &mut self,
        phase: RoundPhase,
        invitation: Invitation,
    ) -> Option<ShareIntent> {
        if !self.usable(LifelineKind::ChallengeFriend, phase) {
            return None;
        }
        self.challenge_friend = false;
        Some(ShareIntent { invitation })
    }

    fn usable(&self, kind: LifelineKind, phase: RoundPhase) -> bool {
        if !self.is_available(kind) {
            debug!(%kind, "lifeline already used, ignoring");
            return false;
        }
        if phase != RoundPhase::Active {
            debug!(%kind, ?phase, "round already has feedback, ignoring lifeline");
            return false;
        }
        true
    }

    fn flag(&self, kind: LifelineKind) -> &bool {
        match kind {
            LifelineKind::NarrowField => &self.narrow_field,
            LifelineKind::RevealHint => &self.reveal_hint,
            LifelineKind::ChallengeFriend => &self.challenge_friend,
        }
    }
}
