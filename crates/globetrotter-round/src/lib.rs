//! Round rules for Globetrotter.
//!
//! This crate is the bottom of the stack. It knows nothing about rooms,
//! players, or networking. It only knows how a single round of the
//! guessing game behaves:
//!
//! - **Destinations** ([`Destination`], [`DestinationName`]): what the
//!   catalog hands us, a name, cryptic clues, and fun facts.
//! - **Option sets** ([`OptionSet`]): the shuffled multiple-choice list.
//! - **Lifelines** ([`Lifelines`]): one-time aids that narrow the field,
//!   reveal a hint, or produce a "challenge a friend" link.
//! - **Rounds** ([`Round`], [`RoundPhase`], [`AttemptBudget`]): the guess
//!   state machine and its [`Feedback`].
//! - **Invitations** ([`Invitation`]): the `?invitedBy=..&score=..` links.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session / Room layers (above)  ← sequence rounds, own budgets and scores
//!     ↕
//! Protocol layer                 ← carries Feedback, Hint, scores on the wire
//!     ↕
//! Round layer (this crate)       ← pure rules + an injected `rand::Rng`
//! ```

mod destination;
mod error;
mod invite;
mod lifeline;
mod options;
mod round;
mod score;

pub use destination::{Destination, DestinationId, DestinationName};
pub use error::{InviteError, OptionSetError};
pub use invite::{Invitation, ShareIntent};
pub use lifeline::{Hint, LifelineKind, LifelineScope, Lifelines};
pub use options::{distractor_pool, OptionSet, DEFAULT_OPTION_COUNT};
pub use round::{AttemptBudget, Feedback, MissTally, Round, RoundPhase};
pub use score::SessionScore;
