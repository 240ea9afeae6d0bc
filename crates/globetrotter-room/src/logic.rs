//! The room's game rules.
//!
//! [`RoomGame`] is the authoritative shared round. It is plain data plus
//! methods; the room actor owns one and feeds it commands one at a time,
//! so there is never more than one writer.
//!
//! Every method returns a [`Step`]: the events to fan out, each paired
//! with a [`Recipient`], and optionally the generation of a destination
//! fetch the actor should start. The rules never do I/O themselves.

use globetrotter_protocol::{
    ClientEvent, PlayerId, PlayerInfo, Recipient, RoomCode, RoundView,
    ServerEvent,
};
use globetrotter_round::{
    AttemptBudget, Feedback, Invitation, LifelineKind, Lifelines, MissTally,
    OptionSet, Round, RoundPhase, SessionScore, distractor_pool,
};
use globetrotter_session::{CatalogError, FetchedDestination};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{RoomConfig, RoomError, RoomState};

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// The result of applying one command to a [`RoomGame`].
#[derive(Debug, Default)]
pub struct Step {
    /// Events to deliver, in order.
    pub events: Vec<(Recipient, ServerEvent)>,
    /// Start a destination fetch tagged with this generation.
    pub fetch: Option<u64>,
}

impl Step {
    fn push(&mut self, to: Recipient, event: ServerEvent) {
        self.events.push((to, event));
    }
}

// ---------------------------------------------------------------------------
// Shared round slot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum SharedRound {
    Idle,
    Loading,
    Ready { round: Round, budget: AttemptBudget },
    Failed { reason: String },
}

/// A participant, in join order.
#[derive(Debug, Clone)]
struct Participant {
    info: PlayerInfo,
    lifelines: Lifelines,
}

// ---------------------------------------------------------------------------
// RoomGame
// ---------------------------------------------------------------------------

/// The shared state of one room.
#[derive(Debug, Clone)]
pub struct RoomGame {
    code: RoomCode,
    config: RoomConfig,
    players: Vec<Participant>,
    score: SessionScore,
    /// Bumped every time a new destination is requested. Client events and
    /// fetch results carrying any other value are stale.
    generation: u64,
    slot: SharedRound,
}

impl RoomGame {
    pub fn new(code: RoomCode, config: RoomConfig) -> Self {
        Self {
            code,
            config: config.validated(),
            players: Vec::new(),
            score: SessionScore::default(),
            generation: 0,
            slot: SharedRound::Idle,
        }
    }

    // -- Membership -------------------------------------------------------

    /// Adds a player under `name`.
    ///
    /// The joiner gets `Welcome` and a full `Snapshot`; everyone else gets
    /// `PlayerJoined`, and all get the new `Scoreboard`. The very first
    /// join also requests the first destination.
    ///
    /// # Errors
    /// [`RoomError::AlreadyInRoom`], [`RoomError::RoomFull`],
    /// [`RoomError::BlankName`].
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: &str,
    ) -> Result<Step, RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::BlankName);
        }
        if self.is_member(id) {
            return Err(RoomError::AlreadyInRoom(id, self.code.clone()));
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        let info = PlayerInfo {
            id,
            name: name.to_string(),
            score: 0,
        };
        self.players.push(Participant {
            info: info.clone(),
            lifelines: Lifelines::new(),
        });
        info!(room = %self.code, player_id = %id, players = self.players.len(), "player joined");

        let mut step = Step::default();
        step.push(Recipient::Player(id), ServerEvent::Welcome {
            room: self.code.clone(),
            player: id,
        });
        step.push(Recipient::Player(id), self.snapshot());
        step.push(Recipient::AllExcept(id), ServerEvent::PlayerJoined {
            player: info,
        });
        step.push(Recipient::All, self.scoreboard());

        if matches!(self.slot, SharedRound::Idle) {
            self.begin_round(&mut step);
        }
        Ok(step)
    }

    /// Removes a player.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `id` isn't a member.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Step, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.info.id == id)
            .ok_or_else(|| RoomError::NotInRoom(id, self.code.clone()))?;
        self.players.remove(index);
        info!(room = %self.code, player_id = %id, players = self.players.len(), "player left");

        let mut step = Step::default();
        step.push(Recipient::All, ServerEvent::PlayerLeft { player: id });
        step.push(Recipient::All, self.scoreboard());
        Ok(step)
    }

    pub fn is_member(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.info.id == id)
    }

    // -- Client events ----------------------------------------------------

    /// Applies one participant event to the shared round.
    ///
    /// Events from non-members and events naming another round generation
    /// are dropped. So are guesses on a resolved round, spent lifelines,
    /// and `NextRound` while a round is still being played.
    pub fn handle_event(
        &mut self,
        sender: PlayerId,
        event: ClientEvent,
        rng: &mut impl Rng,
    ) -> Step {
        let mut step = Step::default();
        if !self.is_member(sender) {
            warn!(room = %self.code, %sender, "event from non-member, ignoring");
            return step;
        }
        if event.round() != self.generation {
            debug!(
                room = %self.code,
                %sender,
                round = event.round(),
                current = self.generation,
                "stale round event, ignoring"
            );
            return step;
        }

        match event {
            ClientEvent::Guess { round, option } => {
                self.guess(sender, round, &option, &mut step);
            }
            ClientEvent::UseLifeline { round, lifeline } => {
                self.use_lifeline(sender, round, lifeline, rng, &mut step);
            }
            ClientEvent::NextRound { .. } => {
                if self.state().can_advance() {
                    self.begin_round(&mut step);
                } else {
                    debug!(room = %self.code, %sender, state = %self.state(), "next round refused");
                }
            }
        }
        step
    }

    fn guess(
        &mut self,
        sender: PlayerId,
        generation: u64,
        option: &str,
        step: &mut Step,
    ) {
        let SharedRound::Ready { round, budget } = &mut self.slot else {
            debug!(room = %self.code, %sender, "guess with no round in play");
            return;
        };
        let Some(feedback) = round.submit_guess(option, budget, &mut self.score)
        else {
            return;
        };
        let phase = round.phase();

        if matches!(feedback, Feedback::Correct { .. }) {
            if let Some(p) = self.players.iter_mut().find(|p| p.info.id == sender) {
                p.info.score += 1;
            }
        }
        info!(room = %self.code, %sender, round = generation, %phase, "guess resolved");

        step.push(Recipient::All, ServerEvent::GuessResolved {
            round: generation,
            player: sender,
            phase,
            feedback,
        });
        if phase.is_resolved() {
            step.push(Recipient::All, self.scoreboard());
        }
    }

    fn use_lifeline(
        &mut self,
        sender: PlayerId,
        generation: u64,
        kind: LifelineKind,
        rng: &mut impl Rng,
        step: &mut Step,
    ) {
        let SharedRound::Ready { round, .. } = &self.slot else {
            return;
        };
        let Some(player) = self.players.iter_mut().find(|p| p.info.id == sender)
        else {
            return;
        };
        let phase = round.phase();
        let to = Recipient::Player(sender);

        let event = match kind {
            LifelineKind::NarrowField => player
                .lifelines
                .apply_narrow_field(phase, round.options(), round.destination(), rng)
                .map(|options| ServerEvent::OptionsNarrowed {
                    round: generation,
                    options,
                }),
            LifelineKind::RevealHint => player
                .lifelines
                .apply_reveal_hint(phase, round.destination())
                .map(|hint| ServerEvent::HintRevealed {
                    round: generation,
                    hint,
                }),
            LifelineKind::ChallengeFriend => {
                let invitation =
                    Invitation::new(player.info.name.clone(), player.info.score)
                        .with_room(self.code.as_str());
                player
                    .lifelines
                    .apply_challenge_friend(phase, invitation)
                    .map(|intent| ServerEvent::ChallengeReady {
                        round: generation,
                        invitation: intent.invitation,
                    })
            }
        };

        if let Some(event) = event {
            debug!(room = %self.code, %sender, lifeline = %kind, "lifeline used");
            step.push(to, event);
        }
    }

    // -- Round loading ----------------------------------------------------

    fn begin_round(&mut self, step: &mut Step) {
        self.generation += 1;
        self.slot = SharedRound::Loading;
        info!(room = %self.code, round = self.generation, "loading destination");
        step.push(Recipient::All, ServerEvent::RoundLoading {
            round: self.generation,
        });
        step.fetch = Some(self.generation);
    }

    /// Installs the result of the fetch tagged `generation`.
    ///
    /// Results for any other generation, or arriving when no fetch is
    /// pending, are dropped.
    pub fn round_loaded(
        &mut self,
        generation: u64,
        fetched: Result<FetchedDestination, CatalogError>,
        rng: &mut impl Rng,
    ) -> Step {
        let mut step = Step::default();
        if generation != self.generation
            || !matches!(self.slot, SharedRound::Loading)
        {
            debug!(room = %self.code, stale = generation, current = self.generation, "dropping stale destination");
            return step;
        }

        let built = fetched.map_err(|e| e.to_string()).and_then(|fetched| {
            let pool = distractor_pool(&fetched.destination, &fetched.listing);
            OptionSet::build(
                &fetched.destination,
                &pool,
                self.config.option_count,
                rng,
            )
            .map(|options| (fetched.destination, options))
            .map_err(|e| e.to_string())
        });

        match built {
            Ok((destination, options)) => {
                for player in &mut self.players {
                    player.lifelines.reset();
                }
                self.slot = SharedRound::Ready {
                    round: Round::new(generation, destination, options)
                        .with_tally(MissTally::LostRound),
                    budget: AttemptBudget::new(self.config.attempts_per_round),
                };
                info!(room = %self.code, round = generation, "round started");
                if let Some(view) = self.view() {
                    step.push(Recipient::All, ServerEvent::RoundStarted { view });
                }
            }
            Err(reason) => {
                warn!(room = %self.code, round = generation, %reason, "round failed to load");
                self.slot = SharedRound::Failed {
                    reason: reason.clone(),
                };
                step.push(Recipient::All, ServerEvent::RoundFailed {
                    round: generation,
                    reason,
                });
            }
        }
        step
    }

    // -- Views ------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Players in join order.
    pub fn players(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(|p| p.info.clone()).collect()
    }

    /// A player's lifelines for the current round.
    pub fn lifelines(&self, id: PlayerId) -> Option<&Lifelines> {
        self.players
            .iter()
            .find(|p| p.info.id == id)
            .map(|p| &p.lifelines)
    }

    pub fn state(&self) -> RoomState {
        match &self.slot {
            SharedRound::Idle => RoomState::Idle,
            SharedRound::Loading => RoomState::Loading,
            SharedRound::Ready { round, .. } if round.phase().is_resolved() => {
                RoomState::RoundOver
            }
            SharedRound::Ready { .. } => RoomState::InRound,
            SharedRound::Failed { .. } => RoomState::RoundFailed,
        }
    }

    pub fn phase(&self) -> Option<RoundPhase> {
        match &self.slot {
            SharedRound::Ready { round, .. } => Some(round.phase()),
            _ => None,
        }
    }

    /// Why the last fetch failed, while the room is `RoundFailed`.
    pub fn failure(&self) -> Option<&str> {
        match &self.slot {
            SharedRound::Failed { reason } => Some(reason.as_str()),
            _ => None,
        }
    }

    /// What participants see of the current round.
    pub fn view(&self) -> Option<RoundView> {
        let SharedRound::Ready { round, budget } = &self.slot else {
            return None;
        };
        Some(RoundView {
            round: self.generation,
            destination: round.destination().id.clone(),
            clues: round.destination().clues.clone(),
            options: round.options().clone(),
            attempts_left: budget.remaining(),
        })
    }

    /// The full state for a late joiner.
    pub fn snapshot(&self) -> ServerEvent {
        ServerEvent::Snapshot {
            players: self.players(),
            score: self.score,
            round: self.view(),
            phase: self.phase(),
        }
    }

    fn scoreboard(&self) -> ServerEvent {
        ServerEvent::Scoreboard {
            players: self.players(),
            score: self.score,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
