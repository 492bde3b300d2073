//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
///
/// A `ProtocolError` on an inbound frame is never fatal to a session:
/// the frame is dropped and the receive loop moves on.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing `type`, or a
    /// field of the wrong JSON type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but is not a usable event (empty discriminant,
    /// non-UTF-8 text, and so on).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
