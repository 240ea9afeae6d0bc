//! The participant-side copy of a room.
//!
//! A [`RoomMirror`] is what a client keeps after joining: it folds the
//! room's [`ServerEvent`]s into a local view and builds the
//! [`ClientEvent`]s the player can send next. The room actor stays the
//! only authority; the mirror just converges on what it broadcasts.
//!
//! Events about a round older than the newest one the mirror has heard
//! of are ignored, so a late broadcast can't drag the view backwards.

use globetrotter_protocol::{
    ClientEvent, PlayerId, PlayerInfo, RoomCode, RoundView, ServerEvent,
};
use globetrotter_round::{
    Feedback, Hint, Invitation, LifelineKind, OptionSet, RoundPhase,
    SessionScore,
};
use tracing::debug;

/// Local view of one room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomMirror {
    room: Option<RoomCode>,
    me: Option<PlayerId>,
    players: Vec<PlayerInfo>,
    score: SessionScore,
    round: Option<RoundView>,
    phase: Option<RoundPhase>,
    /// Newest round generation heard of.
    latest: u64,
    loading: bool,
    failure: Option<String>,
    feedback: Option<Feedback>,
    narrowed: Option<OptionSet>,
    hint: Option<Hint>,
    challenge: Option<Invitation>,
    last_error: Option<(u16, String)>,
}

impl RoomMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the view. Returns `false` if it was stale.
    pub fn apply(&mut self, event: ServerEvent) -> bool {
        match event {
            ServerEvent::Welcome { room, player } => {
                self.room = Some(room);
                self.me = Some(player);
            }
            ServerEvent::Snapshot {
                players,
                score,
                round,
                phase,
            } => {
                self.players = players;
                self.score = score;
                if let Some(view) = &round {
                    self.latest = self.latest.max(view.round);
                }
                self.round = round;
                self.phase = phase;
            }
            ServerEvent::PlayerJoined { player } => {
                match self.players.iter_mut().find(|p| p.id == player.id) {
                    Some(existing) => *existing = player,
                    None => self.players.push(player),
                }
            }
            ServerEvent::PlayerLeft { player } => {
                self.players.retain(|p| p.id != player);
            }
            ServerEvent::Scoreboard { players, score } => {
                self.players = players;
                self.score = score;
            }
            ServerEvent::RoundLoading { round } => {
                if !self.advance_to(round) {
                    return false;
                }
                self.loading = true;
                self.failure = None;
            }
            ServerEvent::RoundStarted { view } => {
                if !self.advance_to(view.round) {
                    return false;
                }
                self.round = Some(view);
                self.phase = Some(RoundPhase::Active);
                self.loading = false;
                self.failure = None;
                self.feedback = None;
                self.narrowed = None;
                self.hint = None;
                self.challenge = None;
            }
            ServerEvent::RoundFailed { round, reason } => {
                if !self.advance_to(round) {
                    return false;
                }
                self.loading = false;
                self.failure = Some(reason);
                self.round = None;
                self.phase = None;
            }
            ServerEvent::GuessResolved {
                round,
                phase,
                feedback,
                ..
            } => {
                let Some(view) = self.current_mut(round) else {
                    return false;
                };
                match &feedback {
                    Feedback::IncorrectRetry { attempts_left, .. } => {
                        view.attempts_left = *attempts_left;
                    }
                    Feedback::IncorrectExhausted { .. } => view.attempts_left = 0,
                    _ => {}
                }
                self.phase = Some(phase);
                self.feedback = Some(feedback);
            }
            ServerEvent::OptionsNarrowed { round, options } => {
                if self.current_mut(round).is_none() {
                    return false;
                }
                self.narrowed = Some(options);
            }
            ServerEvent::HintRevealed { round, hint } => {
                if self.current_mut(round).is_none() {
                    return false;
                }
                self.hint = Some(hint);
            }
            ServerEvent::ChallengeReady { round, invitation } => {
                if self.current_mut(round).is_none() {
                    return false;
                }
                self.challenge = Some(invitation);
            }
            ServerEvent::Error { code, message } => {
                self.last_error = Some((code, message));
            }
        }
        true
    }

    fn advance_to(&mut self, round: u64) -> bool {
        if round < self.latest {
            debug!(round, latest = self.latest, "ignoring stale round event");
            return false;
        }
        self.latest = round;
        true
    }

    fn current_mut(&mut self, round: u64) -> Option<&mut RoundView> {
        self.round.as_mut().filter(|view| view.round == round)
    }

    // -- Outgoing ---------------------------------------------------------

    /// A guess on the current round, if it still takes guesses.
    ///
    /// Every outgoing builder returns `None` while the next round loads.
    pub fn guess(&self, option: &str) -> Option<ClientEvent> {
        if self.loading {
            return None;
        }
        let view = self.round.as_ref()?;
        if !self.phase?.accepts_guesses() {
            return None;
        }
        Some(ClientEvent::Guess {
            round: view.round,
            option: option.to_string(),
        })
    }

    /// A lifeline request on the current round, if nobody has guessed yet.
    pub fn use_lifeline(&self, lifeline: LifelineKind) -> Option<ClientEvent> {
        if self.loading {
            return None;
        }
        let view = self.round.as_ref()?;
        if self.phase? != RoundPhase::Active {
            return None;
        }
        Some(ClientEvent::UseLifeline {
            round: view.round,
            lifeline,
        })
    }

    /// A request to move on, once the round is resolved or failed.
    pub fn next_round(&self) -> Option<ClientEvent> {
        if self.loading {
            return None;
        }
        if self.failure.is_some() {
            return Some(ClientEvent::NextRound { round: self.latest });
        }
        let view = self.round.as_ref()?;
        self.phase?
            .is_resolved()
            .then_some(ClientEvent::NextRound { round: view.round })
    }

    // -- Queries ----------------------------------------------------------

    pub fn room(&self) -> Option<&RoomCode> {
        self.room.as_ref()
    }

    pub fn me(&self) -> Option<PlayerId> {
        self.me
    }

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn round(&self) -> Option<&RoundView> {
        self.round.as_ref()
    }

    pub fn phase(&self) -> Option<RoundPhase> {
        self.phase
    }

    /// Options to display: this player's 50:50 result if they used it.
    pub fn options(&self) -> Option<&OptionSet> {
        self.narrowed
            .as_ref()
            .or_else(|| self.round.as_ref().map(|view| &view.options))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    pub fn challenge(&self) -> Option<&Invitation> {
        self.challenge.as_ref()
    }

    pub fn last_error(&self) -> Option<(u16, &str)> {
        self.last_error
            .as_ref()
            .map(|(code, message)| (*code, message.as_str()))
    }
}
