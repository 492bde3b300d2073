//! Unified error type for Easel.

use easel_protocol::ProtocolError;
use easel_room::RoomError;
use easel_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls the
/// `?` operator uses to convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum EaselError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, already joined, shut down).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use easel_protocol::{ClientId, RoomId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let easel_err: EaselError = err.into();
        assert!(matches!(easel_err, EaselError::Transport(_)));
        assert!(easel_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let easel_err: EaselError = err.into();
        assert!(matches!(easel_err, EaselError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::AlreadyInRoom(ClientId(7), RoomId::new("lobby"));
        let easel_err: EaselError = err.into();
        assert!(matches!(easel_err, EaselError::Room(_)));
        assert_eq!(easel_err.to_string(), "client C-7 already in room lobby");
    }
}
