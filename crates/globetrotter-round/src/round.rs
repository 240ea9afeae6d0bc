//! The round state machine.
//!
//! A round presents one destination. The player guesses until the round
//! resolves:
//!
//! ```text
//!             ┌──(wrong, budget left)──→ ResolvedIncorrectRetry ──┐
//!             │                                 │                 │
//!   Active ───┤                          (keeps guessing)         │
//!             │                                 ▼                 │
//!             ├──(right)──────────────→ ResolvedCorrect ←─(right)─┤
//!             │                                                   │
//!             └──(wrong, budget spent)→ ResolvedIncorrectExhausted ←┘
//! ```
//!
//! `ResolvedCorrect` and `ResolvedIncorrectExhausted` are terminal for the
//! round. The wrong-attempt budget is NOT owned by the round: solo play
//! shares one budget across the whole run, rooms hand in a fresh one per
//! round. Either way the round only borrows it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Destination, Hint, Lifelines, OptionSet, SessionScore};

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where a round is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    /// No guess made yet.
    Active,
    /// The player guessed right. Terminal.
    ResolvedCorrect,
    /// A wrong guess with budget to spare. The player keeps guessing.
    ResolvedIncorrectRetry,
    /// A wrong guess spent the last attempt. Terminal, and in solo play
    /// the end of the run.
    ResolvedIncorrectExhausted,
}

impl RoundPhase {
    /// Returns `true` if a guess would be evaluated.
    pub fn accepts_guesses(self) -> bool {
        matches!(self, Self::Active | Self::ResolvedIncorrectRetry)
    }

    /// Returns `true` once the round has a final outcome.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::ResolvedCorrect | Self::ResolvedIncorrectExhausted)
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::ResolvedCorrect => write!(f, "ResolvedCorrect"),
            Self::ResolvedIncorrectRetry => write!(f, "ResolvedIncorrectRetry"),
            Self::ResolvedIncorrectExhausted => {
                write!(f, "ResolvedIncorrectExhausted")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MissTally
// ---------------------------------------------------------------------------

/// When a round adds to [`SessionScore::incorrect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissTally {
    /// Every wrong guess counts, retryable or not. Solo play.
    #[default]
    EveryGuess,
    /// Only the guess that loses the round counts. Rooms.
    LostRound,
}

// ---------------------------------------------------------------------------
// AttemptBudget
// ---------------------------------------------------------------------------

/// Wrong guesses left before the round (or run) is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptBudget {
    remaining: u32,
    starting: u32,
}

impl AttemptBudget {
    pub fn new(starting: u32) -> Self {
        Self {
            remaining: starting,
            starting,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn starting(&self) -> u32 {
        self.starting
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Spends one attempt and returns what is left. Never goes below 0.
    pub fn consume(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    /// Refills to the starting value.
    pub fn reset(&mut self) {
        self.remaining = self.starting;
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// What the player is told after acting on a round.
///
/// Each variant carries only the fields that make sense for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Feedback {
    Correct {
        selected: String,
        fun_fact: Option<String>,
    },
    IncorrectRetry {
        selected: String,
        attempts_left: u32,
    },
    IncorrectExhausted {
        selected: String,
        /// The correct answer, revealed now that the round is lost.
        answer: String,
        fun_fact: Option<String>,
    },
    HintRevealed {
        hint: Hint,
    },
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// One destination, its options, and the guessing progress on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    number: u64,
    destination: Destination,
    options: OptionSet,
    phase: RoundPhase,
    selection: Option<String>,
    hint: Option<Hint>,
    #[serde(default)]
    tally: MissTally,
}

impl Round {
    /// Starts an `Active` round. `number` is the caller's round counter.
    ///
    /// Misses are tallied per guess; see [`with_tally`](Self::with_tally).
    pub fn new(number: u64, destination: Destination, options: OptionSet) -> Self {
        Self {
            number,
            destination,
            options,
            phase: RoundPhase::Active,
            selection: None,
            hint: None,
            tally: MissTally::default(),
        }
    }

    pub fn with_tally(mut self, tally: MissTally) -> Self {
        self.tally = tally;
        self
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// The most recent guess, if any.
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    pub fn tally(&self) -> MissTally {
        self.tally
    }

    /// Evaluates a guess.
    ///
    /// Names outside the option set are simply wrong; the option list is
    /// the UI's job, not the state machine's. Returns `None` (and changes
    /// nothing) when the round no longer accepts guesses or the budget is
    /// already spent.
    pub fn submit_guess(
        &mut self,
        selected: &str,
        budget: &mut AttemptBudget,
        score: &mut SessionScore,
    ) -> Option<Feedback> {
        if !self.phase.accepts_guesses() || budget.is_exhausted() {
            debug!(round = self.number, phase = %self.phase, "guess ignored");
            return None;
        }

        self.selection = Some(selected.to_string());
        let fun_fact = self.destination.first_fun_fact().map(str::to_string);

        if selected == self.destination.name {
            self.phase = RoundPhase::ResolvedCorrect;
            score.record_correct();
            debug!(round = self.number, "correct guess");
            return Some(Feedback::Correct {
                selected: selected.to_string(),
                fun_fact,
            });
        }

        let attempts_left = budget.consume();
        if self.tally == MissTally::EveryGuess {
            score.record_incorrect();
        }
        if attempts_left > 0 {
            self.phase = RoundPhase::ResolvedIncorrectRetry;
            debug!(round = self.number, attempts_left, "wrong guess");
            Some(Feedback::IncorrectRetry {
                selected: selected.to_string(),
                attempts_left,
            })
        } else {
            self.phase = RoundPhase::ResolvedIncorrectExhausted;
            if self.tally == MissTally::LostRound {
                score.record_incorrect();
            }
            debug!(round = self.number, "wrong guess, attempts exhausted");
            Some(Feedback::IncorrectExhausted {
                selected: selected.to_string(),
                answer: self.destination.name.clone(),
                fun_fact,
            })
        }
    }

    /// Spends the 50:50 lifeline on this round's options.
    pub fn narrow_field(
        &mut self,
        lifelines: &mut Lifelines,
        rng: &mut impl Rng,
    ) -> Option<&OptionSet> {
        let narrowed = lifelines.apply_narrow_field(
            self.phase,
            &self.options,
            &self.destination,
            rng,
        )?;
        self.options = narrowed;
        Some(&self.options)
    }

    /// Spends the hint lifeline and keeps the hint on display.
    pub fn reveal_hint(&mut self, lifelines: &mut Lifelines) -> Option<Feedback> {
        let hint = lifelines.apply_reveal_hint(self.phase, &self.destination)?;
        self.hint = Some(hint.clone());
        Some(Feedback::HintRevealed { hint })
    }
}
