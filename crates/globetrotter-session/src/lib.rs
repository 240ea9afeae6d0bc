//! Solo play for Globetrotter.
//!
//! This crate owns everything that spans rounds for a single player:
//!
//! 1. **The catalog seam**: the [`Catalog`] trait that hands out
//!    destinations, and [`StaticCatalog`] for demos and tests
//! 2. **The session controller**: [`Session`]: score, wrong-attempt
//!    budget, lifelines, history, round loading and game over
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)      ← shares the Catalog seam for multiplayer rounds
//!     ↕
//! Session layer (this crate)  ← sequences rounds for one player
//!     ↕
//! Round layer (below)     ← option sets, lifelines, the guess state machine
//! ```

#![allow(async_fn_in_trait)]

mod catalog;
mod error;
mod session;

pub use catalog::{Catalog, FetchedDestination, StaticCatalog, fetch_destination};
pub use error::{CatalogError, SessionError};
pub use session::{
    LoadOutcome, RoundRecord, RoundSlot, RoundTicket, Session, SessionConfig,
};
