//! Transport abstraction layer for Easel.
//!
//! Provides the [`Transport`], [`Upgrade`], and [`Connection`] traits that
//! abstract over the persistent bidirectional channel clients talk through,
//! plus the [`ConnectParams`] every connection carries from its upgrade
//! request.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    DEFAULT_HANDSHAKE_TIMEOUT, PendingWebSocket, WebSocketConnection, WebSocketTransport,
};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Parameters a client supplies when opening a connection.
///
/// Read from the query string of the upgrade request:
/// `?name=Alice&room=r1`. Both are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    /// Display name. Empty when the client sent none.
    pub name: String,
    /// Requested room. `None` when absent or empty, in which case the
    /// server picks one.
    pub room: Option<String>,
}

impl ConnectParams {
    /// Parses connect parameters from a raw (still percent-encoded) query
    /// string. Unknown keys are ignored; for repeated keys the last wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "name" => params.name = value.into_owned(),
                "room" => {
                    params.room = if value.is_empty() {
                        None
                    } else {
                        Some(value.into_owned())
                    };
                }
                _ => {}
            }
        }
        params
    }
}

/// Accepts new incoming connections.
///
/// Accepting only takes the raw stream off the listener. The protocol
/// handshake happens later in [`Upgrade::upgrade`], so a peer that stalls
/// mid-handshake never holds up the accept loop.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// An accepted stream that has not been upgraded yet.
    type Pending: Upgrade<Connection = Self::Connection, Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming stream.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// An accepted stream waiting for its handshake.
pub trait Upgrade: Send + 'static {
    /// The connection produced once the handshake completes.
    type Connection: Connection;
    /// The error type for the handshake.
    type Error: std::error::Error + Send + Sync;

    /// Performs the handshake and returns the live connection.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that exchanges text frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame to the remote peer.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next data frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the parameters the client connected with.
    fn params(&self) -> &ConnectParams;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connect_params_name_and_room() {
        let params = ConnectParams::from_query(Some("name=Alice&room=r1"));
        assert_eq!(params.name, "Alice");
        assert_eq!(params.room.as_deref(), Some("r1"));
    }

    #[test]
    fn test_connect_params_missing_query() {
        let params = ConnectParams::from_query(None);
        assert_eq!(params, ConnectParams::default());
    }

    #[test]
    fn test_connect_params_empty_room_is_absent() {
        // Browsers submit `?room=` when the room field is left blank.
        let params = ConnectParams::from_query(Some("name=Bob&room="));
        assert_eq!(params.name, "Bob");
        assert_eq!(params.room, None);
    }

    #[test]
    fn test_connect_params_percent_decoded() {
        let params =
            ConnectParams::from_query(Some("name=Jos%C3%A9+M&room=salle%201"));
        assert_eq!(params.name, "José M");
        assert_eq!(params.room.as_deref(), Some("salle 1"));
    }

    #[test]
    fn test_connect_params_ignores_unknown_keys() {
        let params = ConnectParams::from_query(Some("foo=bar&name=Carol"));
        assert_eq!(params.name, "Carol");
        assert_eq!(params.room, None);
    }
}
