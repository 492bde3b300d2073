//! `EaselServer` builder and server loop.
//!
//! This is the entry point for running an Easel hub. It ties the layers
//! together: transport → protocol → room.

use std::future::Future;
use std::sync::Arc;

use easel_protocol::{Codec, JsonCodec};
use easel_room::{RoomConfig, RoomRegistry};
use easel_transport::{Transport, Upgrade, WebSocketTransport};

use crate::EaselError;
use crate::handler::handle_connection;

/// Address the builder binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9090";

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec + Clone> {
    pub(crate) registry: RoomRegistry<C>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting an Easel server.
///
/// # Example
///
/// ```rust,no_run
/// use easel::prelude::*;
///
/// # async fn start() -> Result<(), EaselError> {
/// let server = EaselServer::builder()
///     .bind("0.0.0.0:9090")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct EaselServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl EaselServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// Returns [`EaselError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<EaselServer<JsonCodec>, EaselError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: RoomRegistry::with_codec(self.room_config, JsonCodec),
            codec: JsonCodec,
        });

        Ok(EaselServer { transport, state })
    }
}

impl Default for EaselServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Easel server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct EaselServer<C: Codec + Clone = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl EaselServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> EaselServerBuilder {
        EaselServerBuilder::new()
    }
}

impl<C: Codec + Clone> EaselServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), EaselError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` completes, then shuts every
    /// room down.
    ///
    /// Shutting a room down closes its members' outboxes, so each session
    /// attached to it leaves and closes its connection.
    pub async fn run_until<F>(mut self, signal: F) -> Result<(), EaselError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(addr = ?self.local_addr().ok(), "Easel server running");
        let mut signal = std::pin::pin!(signal);

        loop {
            tokio::select! {
                () = &mut signal => {
                    tracing::info!("shutdown requested, no longer accepting");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(pending) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let peer = pending.peer_addr();
                            let conn = match pending.upgrade().await {
                                Ok(conn) => conn,
                                Err(e) => {
                                    tracing::debug!(%peer, error = %e, "upgrade failed");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        self.state.registry.shutdown().await;
        tracing::info!("Easel server stopped");
        Ok(())
    }
}
