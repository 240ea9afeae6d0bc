//! # Globetrotter
//!
//! A destination-guessing game: cryptic clues, a handful of options, one
//! right answer. Play alone through a [`Session`], or together in a room
//! where everyone converges on the same round.
//!
//! This crate re-exports the layers and adds the two pieces that sit on
//! top of them: a unified [`GlobetrotterError`] and the [`Relay`], which
//! turns bytes from participants into room operations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use globetrotter::prelude::*;
//!
//! # async fn run() -> Result<(), GlobetrotterError> {
//! let catalog = StaticCatalog::from_json(
//!     r#"[{ "id": 1, "name": "Paris", "clues": ["City of light"] }]"#,
//! )?;
//! let mut session = Session::new(SessionConfig::default());
//! let mut rng = rand::rng();
//! session.start_round(&catalog, &mut rng).await?;
//!
//! if let Some(feedback) = session.submit_guess("Paris") {
//!     println!("{feedback:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod relay;

pub use error::GlobetrotterError;
pub use relay::Relay;

pub use globetrotter_protocol as protocol;
pub use globetrotter_room as room;
pub use globetrotter_round as round;
pub use globetrotter_session as session;

pub mod prelude {
    //! Everything a game loop or a relay host usually needs.

    pub use crate::{GlobetrotterError, Relay};

    pub use globetrotter_protocol::{
        ClientEvent, Codec, Envelope, JsonCodec, Payload, PlayerId, PlayerInfo,
        ProtocolError, RoomCode, RoundView, ServerEvent,
    };
    pub use globetrotter_room::{
        PlayerSender, RoomConfig, RoomError, RoomInfo, RoomManager, RoomMirror,
        RoomState,
    };
    pub use globetrotter_round::{
        Destination, DestinationId, DestinationName, Feedback, Hint,
        Invitation, LifelineKind, LifelineScope, MissTally, OptionSet,
        RoundPhase, SessionScore, ShareIntent,
    };
    pub use globetrotter_session::{
        Catalog, CatalogError, RoundRecord, Session, SessionConfig,
        SessionError, StaticCatalog,
    };
}
