//! Wire protocol for Easel.
//!
//! This crate defines what clients and the hub say to each other:
//!
//! - **Types** ([`Event`], [`EventKind`], [`ClientId`], [`RoomId`]):
//!   the structures that travel on the wire and name its participants.
//! - **Frames** ([`Frame`]): an event plus the exact text it arrived as.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are turned
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (text frames) → Protocol (Frame / Event) → Room (history, fan-out)
//! ```

mod codec;
mod error;
mod frame;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use frame::Frame;
pub use types::{ClientId, Event, EventKind, RoomId};
