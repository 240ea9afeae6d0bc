//! Cumulative score for a run (solo) or a room.

use serde::{Deserialize, Serialize};

/// Correct answers and misses.
///
/// What counts as a miss is up to the round's
/// [`MissTally`](crate::MissTally): every wrong guess in solo play, every
/// lost round in a room. Both counters only ever go up;
/// [`reset`](Self::reset) is reserved for an explicit "start over".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScore {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionScore {
    pub fn record_correct(&mut self) {
        self.correct = self.correct.saturating_add(1);
    }

    pub fn record_incorrect(&mut self) {
        self.incorrect = self.incorrect.saturating_add(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
