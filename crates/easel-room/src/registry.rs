//! Room registry: finds or creates rooms and routes joins to them.

use std::collections::HashMap;

use easel_protocol::{Codec, Frame, JsonCodec, RoomId};
use rand::Rng;
use tokio::sync::Mutex;

use crate::room::spawn_room;
use crate::{Member, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// The result of [`RoomRegistry::create_or_join`].
#[derive(Debug)]
pub struct JoinOutcome {
    /// Handle to the room the member is now in.
    pub room: RoomHandle,
    /// History snapshot taken when the member was added, oldest first.
    pub history: Vec<Frame>,
    /// `true` if this join created the room.
    pub created: bool,
}

impl JoinOutcome {
    /// The joined room's id.
    pub fn room_id(&self) -> &RoomId {
        self.room.room_id()
    }
}

/// Every live room in the process, keyed by id.
///
/// The map has its own lock, separate from every room's mailbox. It is
/// held only to look up or insert a handle, never while waiting on a room,
/// so a busy room never slows joins to another.
///
/// Rooms are kept even when their last member leaves; a later join with the
/// same id gets the full history.
pub struct RoomRegistry<C: Codec + Clone = JsonCodec> {
    rooms: Mutex<HashMap<RoomId, RoomHandle>>,
    config: RoomConfig,
    codec: C,
}

impl RoomRegistry<JsonCodec> {
    /// Creates an empty registry using the JSON codec.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec + Clone> RoomRegistry<C> {
    /// Creates an empty registry whose rooms encode with `codec`.
    pub fn with_codec(config: RoomConfig, codec: C) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
            codec,
        }
    }

    /// Settings given to every room this registry creates.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Puts `member` into the room named `room_id`, creating the room if it
    /// does not exist. `None` creates a room under a fresh random id.
    ///
    /// A newly created room has `member` as its only member and creator,
    /// and an empty history. Two concurrent first joins of the same id
    /// always end up in one room.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if `member`'s id is already joined.
    /// - [`RoomError::Unavailable`] if the room has shut down.
    pub async fn create_or_join(
        &self,
        room_id: Option<RoomId>,
        member: Member,
    ) -> Result<JoinOutcome, RoomError> {
        let client_id = member.id();

        let existing = {
            let mut rooms = self.rooms.lock().await;
            let room_id = match room_id {
                Some(id) => id,
                None => unused_room_id(&rooms),
            };

            match rooms.get(&room_id) {
                Some(handle) => handle.clone(),
                None => {
                    let handle = spawn_room(
                        room_id.clone(),
                        member,
                        self.config.clone(),
                        self.codec.clone(),
                    );
                    rooms.insert(room_id.clone(), handle.clone());
                    tracing::info!(%room_id, %client_id, "room created");
                    return Ok(JoinOutcome {
                        room: handle,
                        history: Vec::new(),
                        created: true,
                    });
                }
            }
        };

        let history = existing.join(member).await?;
        Ok(JoinOutcome {
            room: existing,
            history,
            created: false,
        })
    }

    /// Returns the handle for a room, if it exists.
    pub async fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Returns a metadata snapshot for one room.
    pub async fn room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .get(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.info().await
    }

    /// Returns the number of rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Returns the ids of all rooms.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.lock().await.keys().cloned().collect()
    }

    /// Shuts down and forgets every room.
    ///
    /// Each room drops its members' outboxes as it stops, which ends the
    /// sessions attached to it.
    pub async fn shutdown(&self) {
        let handles: Vec<RoomHandle> = {
            let mut rooms = self.rooms.lock().await;
            rooms.drain().map(|(_, handle)| handle).collect()
        };

        tracing::info!(rooms = handles.len(), "shutting down all rooms");
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }
}

impl Default for RoomRegistry<JsonCodec> {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

/// Picks a generated id no live room uses.
fn unused_room_id(rooms: &HashMap<RoomId, RoomHandle>) -> RoomId {
    loop {
        let id = generate_room_id();
        if !rooms.contains_key(&id) {
            return id;
        }
    }
}

/// Generates a random 16-character hex room id (64 bits).
fn generate_room_id() -> RoomId {
    let bytes: [u8; 8] = rand::rng().random();
    RoomId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}
