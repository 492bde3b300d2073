//! Core protocol types for Easel's wire format.
//!
//! Every frame on the wire is one JSON object with a `type` discriminant
//! and whichever optional fields matter for that type:
//!
//! ```text
//! { "type": "stroke", "x": 10.5, "y": 4, "color": "#000", "lineWidth": 2 }
//! { "type": "client_count", "message": "2", "count": 2 }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected client.
///
/// Assigned at accept time from a process-wide counter, so two live
/// clients never share one even when their display names collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// The identifier of a room: whatever string the client asked for, or a
/// server-generated token when it asked for none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a room name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the room name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// EventKind: the discriminant
// ---------------------------------------------------------------------------

/// The `type` of an event.
///
/// The hub only interprets a handful of discriminants. Anything else is an
/// opaque payload (`stroke`, `chat`, `clear`, ...) kept as
/// [`EventKind::Other`] and forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// A client joined the room.
    Connect,
    /// A client left the room.
    Disconnect,
    /// The room's current member count.
    ClientCount,
    /// Who created the room. Fan-out only, never archived.
    RoomCreator,
    /// Inbound control: start (or restart) the game.
    StartGame,
    /// Outbound: the game started, with the first mover and the word.
    GameStarted,
    /// Outbound, to the joiner only: which room it landed in.
    RoomJoined,
    /// Any payload type the hub stores and forwards without reading.
    Other(String),
}

impl EventKind {
    /// Returns the wire spelling of this discriminant.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::ClientCount => "client_count",
            Self::RoomCreator => "room_creator",
            Self::StartGame => "start_game",
            Self::GameStarted => "game_started",
            Self::RoomJoined => "room_joined",
            Self::Other(other) => other,
        }
    }

    /// Returns `true` if a published frame of this kind belongs in a room's
    /// history.
    ///
    /// `room_creator` is re-sent on every membership change, so archiving
    /// it would replay stale creator notices to late joiners. Presence
    /// announcements from the room itself skip the history entirely.
    pub fn is_archived(&self) -> bool {
        !matches!(self, Self::RoomCreator)
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "connect" => Self::Connect,
            "disconnect" => Self::Disconnect,
            "client_count" => Self::ClientCount,
            "room_creator" => Self::RoomCreator,
            "start_game" => Self::StartGame,
            "game_started" => Self::GameStarted,
            "room_joined" => Self::RoomJoined,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One unit of application data exchanged over the transport.
///
/// Fields are present only when meaningful to the event's type and are
/// omitted from the encoded form when `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The discriminant. Required on the wire.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Human-readable text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Drawing x coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    /// Drawing y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    /// Stroke colour, e.g. `"#000"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Stroke width.
    #[serde(
        rename = "lineWidth",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_width: Option<f64>,

    /// Sender id, as stamped by clients.
    #[serde(
        rename = "expediteur",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sender: Option<String>,

    /// Member count (`client_count`). Signed, since relayed client frames
    /// may carry any integer here and must still decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,

    /// The word to draw (`game_started`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

impl Event {
    /// Creates an event of the given kind with every optional field unset.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
            x: None,
            y: None,
            color: None,
            line_width: None,
            sender: None,
            count: None,
            word: None,
        }
    }

    /// Sets the `message` field.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Announces that `name` joined.
    pub fn connect(name: &str) -> Self {
        Self::new(EventKind::Connect)
            .with_message(format!("{name} joined the room"))
    }

    /// Announces that `name` left.
    pub fn disconnect(name: &str) -> Self {
        Self::new(EventKind::Disconnect)
            .with_message(format!("{name} left the room"))
    }

    /// Reports the room's member count, both as text and as a number.
    pub fn client_count(count: usize) -> Self {
        let mut event =
            Self::new(EventKind::ClientCount).with_message(count.to_string());
        event.count = Some(i64::try_from(count).unwrap_or(i64::MAX));
        event
    }

    /// Names the room's creator.
    pub fn room_creator(creator: &str) -> Self {
        Self::new(EventKind::RoomCreator).with_message(creator)
    }

    /// Announces a game start: whose turn it is and the word to draw.
    pub fn game_started(mover: &str, word: &str) -> Self {
        let mut event = Self::new(EventKind::GameStarted)
            .with_message(format!("The game has started! It's {mover}'s turn."));
        event.word = Some(word.to_owned());
        event
    }

    /// Tells a joiner which room it is in.
    pub fn room_joined(room_id: &RoomId) -> Self {
        Self::new(EventKind::RoomJoined).with_message(room_id.as_str())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests. A mismatch here means browser clients can't read
    //! what we send, so they check the JSON, not just a round trip.

    use super::*;

    #[test]
    fn test_client_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ClientId(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(ClientId(7).to_string(), "C-7");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("r1")).unwrap();
        assert_eq!(json, "\"r1\"");
        assert_eq!(RoomId::new("r1").to_string(), "r1");
    }

    #[test]
    fn test_event_kind_known_discriminants() {
        for (wire, kind) in [
            ("connect", EventKind::Connect),
            ("disconnect", EventKind::Disconnect),
            ("client_count", EventKind::ClientCount),
            ("room_creator", EventKind::RoomCreator),
            ("start_game", EventKind::StartGame),
            ("game_started", EventKind::GameStarted),
            ("room_joined", EventKind::RoomJoined),
        ] {
            assert_eq!(EventKind::from(wire), kind);
            assert_eq!(kind.as_str(), wire);
        }
    }

    #[test]
    fn test_event_kind_unknown_is_opaque() {
        let kind = EventKind::from("stroke");
        assert_eq!(kind, EventKind::Other("stroke".into()));
        assert_eq!(String::from(kind), "stroke");
    }

    #[test]
    fn test_published_frames_archived_except_room_creator() {
        assert!(!EventKind::RoomCreator.is_archived());
        assert!(EventKind::Connect.is_archived());
        // A client-sent client_count is relayed like any payload.
        assert!(EventKind::ClientCount.is_archived());
        assert!(EventKind::GameStarted.is_archived());
        assert!(EventKind::Other("chat".into()).is_archived());
    }

    #[test]
    fn test_stroke_event_decodes_wire_names() {
        let json = r##"{"type":"stroke","x":1,"y":2.5,"color":"#000",
                       "lineWidth":3,"expediteur":"abc"}"##;
        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(event.kind, EventKind::Other("stroke".into()));
        assert_eq!(event.x, Some(1.0));
        assert_eq!(event.y, Some(2.5));
        assert_eq!(event.color.as_deref(), Some("#000"));
        assert_eq!(event.line_width, Some(3.0));
        assert_eq!(event.sender.as_deref(), Some("abc"));
        assert_eq!(event.count, None);
    }

    #[test]
    fn test_negative_count_decodes() {
        let event: Event =
            serde_json::from_str(r#"{"type":"client_count","count":-1}"#).unwrap();
        assert_eq!(event.count, Some(-1));
    }

    #[test]
    fn test_fractional_line_width_decodes() {
        let event: Event =
            serde_json::from_str(r#"{"type":"draw","lineWidth":2.5}"#).unwrap();
        assert_eq!(event.line_width, Some(2.5));
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let json: serde_json::Value =
            serde_json::to_value(Event::new("start_game")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "start_game" }));
    }

    #[test]
    fn test_client_count_json_format() {
        let json: serde_json::Value =
            serde_json::to_value(Event::client_count(2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "client_count", "message": "2", "count": 2 })
        );
    }

    #[test]
    fn test_room_creator_json_format() {
        let json: serde_json::Value =
            serde_json::to_value(Event::room_creator("Alice")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "room_creator", "message": "Alice" })
        );
    }

    #[test]
    fn test_game_started_names_mover_and_word() {
        let event = Event::game_started("Alice", "Wilfried");
        assert_eq!(event.kind, EventKind::GameStarted);
        assert_eq!(event.word.as_deref(), Some("Wilfried"));
        assert!(event.message.unwrap().contains("Alice"));
    }

    #[test]
    fn test_presence_messages_carry_name() {
        assert!(Event::connect("Bob").message.unwrap().contains("Bob"));
        assert!(Event::disconnect("Bob").message.unwrap().contains("Bob"));
    }

    #[test]
    fn test_decode_missing_type_fails() {
        let result: Result<Event, _> = serde_json::from_str(r#"{"x": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_wrong_field_type_fails() {
        let result: Result<Event, _> =
            serde_json::from_str(r#"{"type": "stroke", "x": "left"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_null_optional_is_none() {
        let event: Event =
            serde_json::from_str(r#"{"type": "chat", "message": null}"#).unwrap();
        assert_eq!(event.message, None);
    }
}
