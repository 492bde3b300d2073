//! # Easel
//!
//! A real-time multi-room broadcast hub for shared drawing boards.
//!
//! Clients connect over WebSocket with `?name=...&room=...`, get the room's
//! history replayed, and from then on every event any member sends is
//! relayed to the whole room. A `start_game` event hands the turn to the
//! room's first member.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use easel::prelude::*;
//!
//! # async fn start() -> Result<(), EaselError> {
//! let server = EaselServer::builder()
//!     .bind("0.0.0.0:9090")
//!     .room_config(RoomConfig::default())
//!     .build()
//!     .await?;
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::EaselError;
pub use server::{DEFAULT_BIND_ADDR, EaselServer, EaselServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{EaselError, EaselServer, EaselServerBuilder};
    pub use easel_protocol::{Event, EventKind, RoomId};
    pub use easel_room::RoomConfig;
}
