//! Error types for the room layer.

use easel_protocol::{ClientId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The client is already a member of this room.
    #[error("client {0} already in room {1}")]
    AlreadyInRoom(ClientId, RoomId),

    /// The client is not a member of this room (never joined, or already
    /// left).
    #[error("client {0} not in room {1}")]
    NotInRoom(ClientId, RoomId),

    /// The room's mailbox is closed: the actor has shut down.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
