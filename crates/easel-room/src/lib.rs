//! Rooms for Easel.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! membership, event history, and game-turn state. The registry maps room
//! ids to running rooms and creates them on first join.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: finds or creates rooms, routes joins
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Member`]: a client as its room sees it
//! - [`TurnState`]: whose move it is
//! - [`RoomConfig`]: settings shared by every room

mod broadcast;
mod config;
mod error;
mod registry;
mod room;
mod roster;
mod turn;

pub use broadcast::Delivery;
pub use config::{DEFAULT_GAME_WORD, DEFAULT_MAILBOX_SIZE, RoomConfig};
pub use error::RoomError;
pub use registry::{JoinOutcome, RoomRegistry};
pub use room::{Departure, RoomHandle, RoomInfo};
pub use roster::{Member, Outbox};
pub use turn::TurnState;
