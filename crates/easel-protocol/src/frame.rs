//! A decoded event paired with its exact encoded text.
//!
//! Payload events are forwarded verbatim: fields the hub doesn't model,
//! number spellings, key order all survive, because what goes back out
//! (live or on replay) is the text that came in, not a re-encoding.

use std::sync::Arc;

use crate::{Codec, Event, EventKind, ProtocolError};

/// An [`Event`] together with the text frame that carries it.
///
/// Cheap to clone: rooms push the same frame into every member's outbox
/// and keep it in history without copying the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(Arc<FrameInner>);

#[derive(Debug, PartialEq)]
struct FrameInner {
    event: Event,
    text: String,
}

impl Frame {
    /// Decodes an inbound frame, keeping the original text for forwarding.
    ///
    /// # Errors
    /// - `ProtocolError::Decode` if the bytes are not an event.
    /// - `ProtocolError::InvalidMessage` if the `type` is empty or the
    ///   bytes are not UTF-8.
    pub fn decode<C: Codec>(codec: &C, data: &[u8]) -> Result<Self, ProtocolError> {
        let event: Event = codec.decode(data)?;
        if event.kind.as_str().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "event type must not be empty".into(),
            ));
        }
        let text = std::str::from_utf8(data).map_err(|e| {
            ProtocolError::InvalidMessage(format!("frame is not UTF-8: {e}"))
        })?;
        Ok(Self(Arc::new(FrameInner {
            event,
            text: text.to_owned(),
        })))
    }

    /// Encodes a server-originated event into a frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails, or
    /// `ProtocolError::InvalidMessage` if the codec does not produce text.
    pub fn encode<C: Codec>(codec: &C, event: Event) -> Result<Self, ProtocolError> {
        let bytes = codec.encode(&event)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            ProtocolError::InvalidMessage(format!(
                "codec produced non-UTF-8 output: {e}"
            ))
        })?;
        Ok(Self(Arc::new(FrameInner { event, text })))
    }

    /// The decoded event.
    pub fn event(&self) -> &Event {
        &self.0.event
    }

    /// Shorthand for `self.event().kind`.
    pub fn kind(&self) -> &EventKind {
        &self.0.event.kind
    }

    /// The encoded text, exactly as it goes on the wire.
    pub fn text(&self) -> &str {
        &self.0.text
    }
}
