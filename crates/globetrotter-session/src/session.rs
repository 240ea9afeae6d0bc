//! The solo session controller.
//!
//! A session is one player's run: a sequence of rounds sharing a score,
//! a wrong-attempt budget, and (by default) one set of lifelines. The run
//! ends the moment a round is lost with the budget spent, and only
//! [`Session::start_over`] begins a new one.
//!
//! ```text
//!   begin_round() ──→ [Loading] ──finish_round(Ok)──→ [Ready(round)]
//!        ↑                  │                              │
//!        │                  └──finish_round(Err)──→ [Failed]
//!        │                                                 │
//!        └─────────────(round resolved, run not over)──────┘
//! ```
//!
//! Loading is split in two so the fetch itself can happen anywhere (a
//! spawned task, a UI callback) without holding `&mut Session`. Each
//! [`RoundTicket`] carries a generation; a response for an older ticket is
//! dropped, so a slow fetch can never overwrite a newer round.

use globetrotter_round::{
    AttemptBudget, DEFAULT_OPTION_COUNT, DestinationId, Feedback, Invitation,
    LifelineScope, Lifelines, MissTally, OptionSet, Round, RoundPhase,
    SessionScore, ShareIntent, distractor_pool,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, FetchedDestination, fetch_destination};
use crate::{CatalogError, SessionError};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Tunables for a solo run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wrong guesses allowed across the whole run. Default: 2.
    pub starting_attempts: u32,

    /// Options shown per round. Default: 4.
    pub option_count: usize,

    /// When lifelines refill. Default: once per run.
    pub lifeline_scope: LifelineScope,

    /// What adds to the incorrect count. Default: every wrong guess.
    #[serde(default)]
    pub miss_tally: MissTally,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_attempts: 2,
            option_count: DEFAULT_OPTION_COUNT,
            lifeline_scope: LifelineScope::PerSession,
            miss_tally: MissTally::EveryGuess,
        }
    }
}

impl SessionConfig {
    pub const MIN_OPTIONS: usize = 2;
    pub const MAX_OPTIONS: usize = 8;

    /// Clamps values into a playable range.
    ///
    /// At least one attempt, and between [`Self::MIN_OPTIONS`] and
    /// [`Self::MAX_OPTIONS`] options so the 50:50 always has something
    /// to remove.
    pub fn validated(mut self) -> Self {
        self.starting_attempts = self.starting_attempts.max(1);
        self.option_count =
            self.option_count.clamp(Self::MIN_OPTIONS, Self::MAX_OPTIONS);
        self
    }
}

// ---------------------------------------------------------------------------
// Slots, tickets, records
// ---------------------------------------------------------------------------

/// What the session is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundSlot {
    /// Nothing requested yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// A round is on screen.
    Ready(Round),
    /// The last fetch failed. The message is for display.
    Failed(String),
}

/// Proof that a round was requested. Hand it back to
/// [`Session::finish_round`] with the fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTicket {
    generation: u64,
}

impl RoundTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`Session::finish_round`] did with a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The round is ready.
    Loaded,
    /// The ticket was stale and the result was dropped.
    Discarded,
}

/// A resolved round, kept in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub number: u64,
    pub destination: DestinationId,
    pub name: String,
    pub phase: RoundPhase,
    pub selection: Option<String>,
}

impl RoundRecord {
    fn of(round: &Round) -> Self {
        Self {
            number: round.number(),
            destination: round.destination().id.clone(),
            name: round.destination().name.clone(),
            phase: round.phase(),
            selection: round.selection().map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One player's run.
///
/// Owns everything that outlives a round: score, budget, lifelines and
/// history. Randomness is passed into the operations that need it.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    score: SessionScore,
    budget: AttemptBudget,
    lifelines: Lifelines,
    slot: RoundSlot,
    /// Bumped on every `begin_round`. Tickets from older values are stale.
    generation: u64,
    /// Rounds successfully loaded in this run.
    rounds_loaded: u64,
    history: Vec<RoundRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let config = config.validated();
        Self {
            budget: AttemptBudget::new(config.starting_attempts),
            config,
            score: SessionScore::default(),
            lifelines: Lifelines::new(),
            slot: RoundSlot::Idle,
            generation: 0,
            rounds_loaded: 0,
            history: Vec::new(),
        }
    }

    // -- Round loading ----------------------------------------------------

    /// Marks a new round as loading and returns its ticket.
    ///
    /// An unresolved round on screen is abandoned without a history entry.
    ///
    /// # Errors
    /// [`SessionError::RunOver`] once the run has ended.
    pub fn begin_round(&mut self) -> Result<RoundTicket, SessionError> {
        if self.is_over() {
            debug!("round requested after game over");
            return Err(SessionError::RunOver);
        }
        self.generation += 1;
        self.slot = RoundSlot::Loading;
        debug!(generation = self.generation, "round loading");
        Ok(RoundTicket {
            generation: self.generation,
        })
    }

    /// Completes a load started by [`begin_round`](Self::begin_round).
    ///
    /// # Errors
    /// - [`SessionError::DestinationFetch`] if `fetched` is an error.
    /// - [`SessionError::Options`] if the listing can't fill the options.
    ///
    /// Both leave a [`RoundSlot::Failed`] slot; the caller may begin
    /// another round. Stale tickets are not errors; they return
    /// [`LoadOutcome::Discarded`] and change nothing.
    pub fn finish_round(
        &mut self,
        ticket: RoundTicket,
        fetched: Result<FetchedDestination, CatalogError>,
        rng: &mut impl Rng,
    ) -> Result<LoadOutcome, SessionError> {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale destination"
            );
            return Ok(LoadOutcome::Discarded);
        }

        let FetchedDestination {
            destination,
            listing,
        } = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "destination fetch failed");
                self.slot = RoundSlot::Failed(e.to_string());
                return Err(e.into());
            }
        };

        let pool = distractor_pool(&destination, &listing);
        let options = match OptionSet::build(
            &destination,
            &pool,
            self.config.option_count,
            rng,
        ) {
            Ok(options) => options,
            Err(e) => {
                warn!(destination = %destination.id, error = %e, "cannot build options");
                self.slot = RoundSlot::Failed(e.to_string());
                return Err(e.into());
            }
        };

        if self.config.lifeline_scope == LifelineScope::PerRound {
            self.lifelines.reset();
        }

        self.rounds_loaded += 1;
        info!(
            round = self.rounds_loaded,
            destination = %destination.id,
            "round started"
        );
        self.slot = RoundSlot::Ready(
            Round::new(self.rounds_loaded, destination, options)
                .with_tally(self.config.miss_tally),
        );
        Ok(LoadOutcome::Loaded)
    }

    /// Fetches from `catalog` and loads the result.
    pub async fn start_round(
        &mut self,
        catalog: &impl Catalog,
        rng: &mut impl Rng,
    ) -> Result<(), SessionError> {
        let ticket = self.begin_round()?;
        let fetched = fetch_destination(catalog).await;
        self.finish_round(ticket, fetched, rng).map(|_| ())
    }

    /// Clears score, budget, lifelines and history.
    ///
    /// Any in-flight ticket goes stale.
    pub fn reset(&mut self) {
        self.score.reset();
        self.budget.reset();
        self.lifelines.reset();
        self.history.clear();
        self.rounds_loaded = 0;
        self.generation += 1;
        self.slot = RoundSlot::Idle;
        info!("run reset");
    }

    /// [`reset`](Self::reset) and then [`start_round`](Self::start_round).
    pub async fn start_over(
        &mut self,
        catalog: &impl Catalog,
        rng: &mut impl Rng,
    ) -> Result<(), SessionError> {
        self.reset();
        self.start_round(catalog, rng).await
    }

    // -- Playing ----------------------------------------------------------

    /// Guesses `selected` on the current round.
    ///
    /// `None` when there is no round on screen, the round is resolved, or
    /// the run is over.
    pub fn submit_guess(&mut self, selected: &str) -> Option<Feedback> {
        let RoundSlot::Ready(round) = &mut self.slot else {
            debug!("guess with no round on screen");
            return None;
        };
        let feedback =
            round.submit_guess(selected, &mut self.budget, &mut self.score)?;
        if round.phase().is_resolved() {
            self.history.push(RoundRecord::of(round));
        }
        if round.phase() == RoundPhase::ResolvedIncorrectExhausted {
            info!(
                correct = self.score.correct,
                incorrect = self.score.incorrect,
                "run over"
            );
        }
        Some(feedback)
    }

    /// Spends the 50:50 on the current round.
    pub fn narrow_field(
        &mut self,
        rng: &mut impl Rng,
    ) -> Option<&OptionSet> {
        match &mut self.slot {
            RoundSlot::Ready(round) => round.narrow_field(&mut self.lifelines, rng),
            _ => None,
        }
    }

    /// Spends the hint on the current round.
    pub fn reveal_hint(&mut self) -> Option<Feedback> {
        match &mut self.slot {
            RoundSlot::Ready(round) => round.reveal_hint(&mut self.lifelines),
            _ => None,
        }
    }

    /// Spends the challenge lifeline, producing an invitation that
    /// carries `player_name` and the current correct count.
    pub fn challenge_friend(&mut self, player_name: &str) -> Option<ShareIntent> {
        let RoundSlot::Ready(round) = &self.slot else {
            return None;
        };
        let invitation = Invitation::new(player_name, self.score.correct);
        self.lifelines
            .apply_challenge_friend(round.phase(), invitation)
    }

    // -- Queries ----------------------------------------------------------

    /// `true` exactly when the current round was lost with the budget spent.
    pub fn is_over(&self) -> bool {
        matches!(
            &self.slot,
            RoundSlot::Ready(round)
                if round.phase() == RoundPhase::ResolvedIncorrectExhausted
        )
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn attempts_left(&self) -> u32 {
        self.budget.remaining()
    }

    pub fn lifelines(&self) -> &Lifelines {
        &self.lifelines
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn slot(&self) -> &RoundSlot {
        &self.slot
    }

    /// The round on screen, if one is loaded.
    pub fn current_round(&self) -> Option<&Round> {
        match &self.slot {
            RoundSlot::Ready(round) => Some(round),
            _ => None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

// =========================================================================
// Tests
// =========================================================================
