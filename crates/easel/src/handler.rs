//! Per-connection session: join, replay, relay, and leave.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Join (or create) the room named in the connect parameters
//!   2. Write the room's history to the client, then `room_joined`
//!   3. Announce the arrival: `connect`, then `client_count` + `room_creator`
//!   4. Loop: relay inbound frames to the room and the room's frames out
//!   5. Leave: `disconnect`, then the updated count, then close

use std::sync::Arc;

use easel_protocol::{ClientId, Codec, Event, EventKind, Frame, RoomId};
use easel_room::{Member, RoomError, RoomHandle};
use easel_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::EaselError;
use crate::server::ServerState;

/// Drop guard that takes a client out of its room when the session ends.
///
/// The normal exit path calls [`release`](Self::release). If the handler
/// returns early or panics instead, `Drop` spawns the same departure. The
/// room's leave is idempotent, so at most one departure is announced.
struct MembershipGuard<C: Codec + Clone> {
    room: RoomHandle,
    client_id: ClientId,
    codec: C,
    armed: bool,
}

impl<C: Codec + Clone> MembershipGuard<C> {
    /// Runs the departure now and disarms the guard.
    async fn release(mut self) {
        self.armed = false;
        depart(&self.room, self.client_id, &self.codec).await;
    }
}

impl<C: Codec + Clone> Drop for MembershipGuard<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let room = self.room.clone();
        let client_id = self.client_id;
        let codec = self.codec.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    depart(&room, client_id, &codec).await;
                });
            }
            Err(_) => {
                tracing::warn!(%client_id, "no runtime to run departure on");
            }
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), EaselError>
where
    C: Codec + Clone,
{
    let conn_id = conn.id();
    let client_id = ClientId(conn_id.into_inner());
    let name = conn.params().name.clone();
    let requested = conn.params().room.clone().map(RoomId::new);
    tracing::debug!(%conn_id, %client_id, %name, "handling new connection");

    // --- Step 1: Join ---
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    let member = Member::new(client_id, name.clone(), outbox);
    let joined = match state.registry.create_or_join(requested, member).await {
        Ok(joined) => joined,
        Err(e) => {
            if let Err(close_err) = conn.close().await {
                tracing::trace!(%client_id, error = %close_err, "close after failed join");
            }
            return Err(e.into());
        }
    };
    let room = joined.room.clone();
    let room_id = room.room_id().clone();
    let guard = MembershipGuard {
        room: room.clone(),
        client_id,
        codec: state.codec.clone(),
        armed: true,
    };
    tracing::info!(
        %room_id,
        %client_id,
        %name,
        created = joined.created,
        replay = joined.history.len(),
        "client joined"
    );

    // --- Step 2: Replay ---
    // Written before the outbox is drained: anything archived after the
    // snapshot is waiting there, so the client sees each frame once.
    for frame in &joined.history {
        conn.send(frame.text()).await?;
    }
    let notice = Frame::encode(&state.codec, Event::room_joined(&room_id))?;
    conn.send(notice.text()).await?;

    // --- Step 3: Announce ---
    let connect = Frame::encode(&state.codec, Event::connect(&name))?;
    room.record_and_broadcast(connect).await?;
    room.announce_presence().await?;

    // --- Step 4: Relay ---
    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    if let Err(e) = relay_inbound(&state.codec, &room, client_id, &data).await {
                        tracing::debug!(%client_id, error = %e, "room unavailable");
                        break;
                    }
                }
                Ok(None) => {
                    tracing::info!(%client_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%client_id, error = %e, "recv error");
                    break;
                }
            },
            outbound = inbox.recv() => match outbound {
                Some(frame) => {
                    if let Err(e) = conn.send(frame.text()).await {
                        tracing::debug!(%client_id, error = %e, "send error");
                        break;
                    }
                }
                None => {
                    tracing::info!(%client_id, %room_id, "room closed");
                    break;
                }
            },
        }
    }

    // --- Step 5: Leave ---
    guard.release().await;
    if let Err(e) = conn.close().await {
        tracing::trace!(%client_id, error = %e, "close after leave failed");
    }
    Ok(())
}

/// Decodes one inbound frame and hands it to the room.
///
/// Undecodable frames are dropped. Only a dead room is an error.
async fn relay_inbound<C: Codec>(
    codec: &C,
    room: &RoomHandle,
    client_id: ClientId,
    data: &[u8],
) -> Result<(), RoomError> {
    let frame = match Frame::decode(codec, data) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(%client_id, error = %e, "failed to decode frame");
            return Ok(());
        }
    };

    match frame.kind() {
        EventKind::StartGame => {
            room.start_game(client_id).await?;
        }
        _ => {
            room.record_and_broadcast(frame).await?;
        }
    }
    Ok(())
}

/// Takes `client_id` out of `room` and, if it was still there, tells the
/// remaining members.
async fn depart<C: Codec>(room: &RoomHandle, client_id: ClientId, codec: &C) {
    let room_id = room.room_id();
    let departure = match room.leave(client_id).await {
        Ok(departure) => departure,
        Err(RoomError::NotInRoom(..)) => {
            tracing::debug!(%room_id, %client_id, "already left");
            return;
        }
        Err(e) => {
            tracing::debug!(%room_id, %client_id, error = %e, "leave failed");
            return;
        }
    };

    tracing::info!(
        %room_id,
        %client_id,
        name = %departure.name,
        remaining = departure.remaining,
        "client left"
    );

    if let Err(e) = announce_departure(room, &departure.name, codec).await {
        tracing::warn!(%room_id, %client_id, error = %e, "failed to announce departure");
    }
}

/// Sends `disconnect` for `name`, then the updated presence.
async fn announce_departure<C: Codec>(
    room: &RoomHandle,
    name: &str,
    codec: &C,
) -> Result<(), EaselError> {
    let frame = Frame::encode(codec, Event::disconnect(name))?;
    room.record_and_broadcast(frame).await?;
    room.announce_presence().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use easel_protocol::JsonCodec;
    use easel_room::{RoomConfig, RoomRegistry};

    use super::*;

    async fn open_room() -> (RoomHandle, mpsc::UnboundedReceiver<Frame>) {
        let registry = RoomRegistry::new(RoomConfig::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let member = Member::new(ClientId(1), "Alice", tx);
        let joined = registry
            .create_or_join(Some(RoomId::new("r1")), member)
            .await
            .unwrap();
        (joined.room, rx)
    }

    #[tokio::test]
    async fn test_announce_departure_sends_disconnect_then_presence() {
        let (room, mut rx) = open_room().await;

        announce_departure(&room, "Bob", &JsonCodec).await.unwrap();
        room.info().await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            kinds.push(frame.kind().to_string());
        }
        assert_eq!(kinds, vec!["disconnect", "client_count", "room_creator"]);
    }

    #[tokio::test]
    async fn test_announce_departure_reports_closed_room() {
        let (room, _rx) = open_room().await;
        room.shutdown().await.unwrap();
        assert!(room.info().await.is_err());

        let err = announce_departure(&room, "Bob", &JsonCodec)
            .await
            .unwrap_err();
        assert!(matches!(err, EaselError::Room(RoomError::Unavailable(_))));
    }
}
