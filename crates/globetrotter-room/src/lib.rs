//! Shared multiplayer rooms for Globetrotter.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! authoritative round. Participants send [`ClientEvent`]s in and get
//! [`ServerEvent`]s back; everyone converges on the same round.
//!
//! # Key types
//!
//! - [`RoomGame`]: the shared-round rules, free of I/O
//! - [`RoomManager`]: creates/destroys rooms, routes players by code
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomMirror`]: a participant's local copy of a room
//! - [`RoomState`]: where the shared round is
//! - [`RoomConfig`]: player limit, per-round attempts, option count
//!
//! [`ClientEvent`]: globetrotter_protocol::ClientEvent
//! [`ServerEvent`]: globetrotter_protocol::ServerEvent

mod config;
mod error;
mod logic;
mod manager;
mod mirror;
mod room;

pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use logic::{RoomGame, Step};
pub use manager::RoomManager;
pub use mirror::RoomMirror;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
