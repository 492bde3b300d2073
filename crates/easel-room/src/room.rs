//! Room actor: an isolated Tokio task that owns one room's state.
//!
//! Each room runs in its own task and is reached only through its mailbox.
//! Membership, history, and turn state are touched by that one task, one
//! command at a time, so every mutation is fully applied before the next
//! one starts and rooms never contend with each other.

use easel_protocol::{ClientId, Codec, Event, Frame, RoomId};
use tokio::sync::{mpsc, oneshot};

use crate::broadcast::{self, Delivery};
use crate::roster::{Member, Roster};
use crate::{RoomConfig, RoomError, TurnState};

/// Commands sent to a room actor through its mailbox.
///
/// Variants carrying a `oneshot::Sender` are request/response: the caller
/// waits for the actor to finish applying the command.
pub(crate) enum RoomCommand {
    /// Add a member; reply with the history snapshot.
    Join {
        member: Member,
        reply: oneshot::Sender<Result<Vec<Frame>, RoomError>>,
    },

    /// Remove a member.
    Leave {
        client_id: ClientId,
        reply: oneshot::Sender<Result<Departure, RoomError>>,
    },

    /// Archive (if applicable) and fan out a frame.
    Publish { frame: Frame },

    /// Broadcast `client_count` then `room_creator`.
    AnnouncePresence,

    /// Reset the turn pointer and announce the game.
    StartGame {
        client_id: ClientId,
        reply: oneshot::Sender<Option<String>>,
    },

    /// Report the member count.
    MemberCount { reply: oneshot::Sender<usize> },

    /// Report room metadata.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// What a successful leave reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Display name of the member who left.
    pub name: String,
    /// Members still in the room.
    pub remaining: usize,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInfo {
    /// The room's id.
    pub room_id: RoomId,
    /// Display name of the client whose join created the room.
    pub creator: String,
    /// Current members in join order.
    pub members: Vec<(ClientId, String)>,
    /// Number of archived frames.
    pub history_len: usize,
    /// Game-turn state.
    pub turn: TurnState,
}

impl RoomInfo {
    /// Number of members currently in the room.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Handle to a running room actor.
///
/// Cheap to clone (a mailbox sender). The registry holds one per room and
/// each joined session holds another.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Adds a member and returns the room's history as of that moment.
    ///
    /// The member's outbox is registered in the same step the snapshot is
    /// taken, so every frame archived later arrives through the outbox and
    /// none is both replayed and delivered live.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if a member with the same id exists.
    /// - [`RoomError::Unavailable`] if the room has shut down.
    pub async fn join(&self, member: Member) -> Result<Vec<Frame>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            member,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a member.
    ///
    /// Safe to call more than once: only the first call for a client
    /// removes it; later calls report [`RoomError::NotInRoom`].
    pub async fn leave(&self, client_id: ClientId) -> Result<Departure, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            client_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Archives `frame` (unless it is a `room_creator`) and fans it out to
    /// every current member. Fire-and-forget; commands are applied in
    /// mailbox order.
    pub async fn record_and_broadcast(&self, frame: Frame) -> Result<(), RoomError> {
        self.send(RoomCommand::Publish { frame }).await
    }

    /// Broadcasts the current `client_count` followed by `room_creator`.
    /// Neither is archived.
    pub async fn announce_presence(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::AnnouncePresence).await
    }

    /// Starts (or restarts) the game on behalf of `client_id` and
    /// broadcasts `game_started`. Returns the first mover's name, or `None`
    /// if the requester is not a member.
    pub async fn start_game(
        &self,
        client_id: ClientId,
    ) -> Result<Option<String>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::StartGame {
            client_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Returns the number of current members.
    pub async fn member_count(&self) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::MemberCount { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Returns a metadata snapshot.
    ///
    /// Since the mailbox is FIFO, the snapshot reflects every command this
    /// caller sent before it.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down. Members' outboxes are dropped with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<C: Codec> {
    room_id: RoomId,
    creator: String,
    config: RoomConfig,
    roster: Roster,
    history: Vec<Frame>,
    turn: TurnState,
    codec: C,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<C: Codec> RoomActor<C> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, creator = %self.creator, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { member, reply } => {
                    let _ = reply.send(self.handle_join(member));
                }
                RoomCommand::Leave { client_id, reply } => {
                    let _ = reply.send(self.handle_leave(client_id));
                }
                RoomCommand::Publish { frame } => {
                    self.record_and_broadcast(frame);
                }
                RoomCommand::AnnouncePresence => {
                    self.announce_presence();
                }
                RoomCommand::StartGame { client_id, reply } => {
                    let _ = reply.send(self.handle_start_game(client_id));
                }
                RoomCommand::MemberCount { reply } => {
                    let _ = reply.send(self.roster.len());
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(&mut self, member: Member) -> Result<Vec<Frame>, RoomError> {
        let client_id = member.id();
        if !self.roster.insert(member) {
            return Err(RoomError::AlreadyInRoom(client_id, self.room_id.clone()));
        }
        tracing::info!(
            room_id = %self.room_id,
            %client_id,
            members = self.roster.len(),
            replay = self.history.len(),
            "member joined"
        );
        Ok(self.history.clone())
    }

    fn handle_leave(&mut self, client_id: ClientId) -> Result<Departure, RoomError> {
        let Some((index, member)) = self.roster.remove(client_id) else {
            return Err(RoomError::NotInRoom(client_id, self.room_id.clone()));
        };

        let before = self.turn;
        self.turn.member_left(index, self.roster.len());
        if before != self.turn {
            tracing::debug!(
                room_id = %self.room_id,
                %before,
                after = %self.turn,
                "turn re-aimed after leave"
            );
        }

        tracing::info!(
            room_id = %self.room_id,
            %client_id,
            members = self.roster.len(),
            "member left"
        );

        Ok(Departure {
            name: member.name().to_owned(),
            remaining: self.roster.len(),
        })
    }

    fn handle_start_game(&mut self, client_id: ClientId) -> Option<String> {
        if !self.roster.contains(client_id) {
            tracing::warn!(
                room_id = %self.room_id,
                %client_id,
                "start_game from non-member, ignoring"
            );
            return None;
        }

        let turn = self.turn.start(self.roster.len())?;
        let mover = self.roster.get(turn)?.name().to_owned();
        tracing::info!(room_id = %self.room_id, %mover, "game started");

        let event = Event::game_started(&mover, &self.config.game_word);
        self.emit(event);
        Some(mover)
    }

    /// Presence is a snapshot of the room right now; it is fanned out but
    /// never archived, so a replay carries no stale counts.
    fn announce_presence(&mut self) {
        if let Some(frame) = self.encode(Event::client_count(self.roster.len())) {
            broadcast::fan_out(&self.room_id, &self.roster, &frame);
        }
        if let Some(frame) = self.encode(Event::room_creator(&self.creator)) {
            broadcast::fan_out(&self.room_id, &self.roster, &frame);
        }
    }

    /// Encodes a room-originated event and records/broadcasts it.
    fn emit(&mut self, event: Event) {
        if let Some(frame) = self.encode(event) {
            self.record_and_broadcast(frame);
        }
    }

    fn encode(&self, event: Event) -> Option<Frame> {
        match Frame::encode(&self.codec, event) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::error!(
                    room_id = %self.room_id,
                    error = %e,
                    "failed to encode room event"
                );
                None
            }
        }
    }

    fn record_and_broadcast(&mut self, frame: Frame) -> Delivery {
        if frame.kind().is_archived() {
            self.history.push(frame.clone());
        }
        broadcast::fan_out(&self.room_id, &self.roster, &frame)
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            creator: self.creator.clone(),
            members: self
                .roster
                .iter()
                .map(|m| (m.id(), m.name().to_owned()))
                .collect(),
            history_len: self.history.len(),
            turn: self.turn,
        }
    }
}

/// Spawns a new room actor whose sole member (and creator) is `creator`,
/// and returns a handle to it.
pub(crate) fn spawn_room<C: Codec>(
    room_id: RoomId,
    creator: Member,
    config: RoomConfig,
    codec: C,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_size.max(1));

    let mut roster = Roster::default();
    let creator_name = creator.name().to_owned();
    roster.insert(creator);

    let actor = RoomActor {
        room_id: room_id.clone(),
        creator: creator_name,
        config,
        roster,
        history: Vec::new(),
        turn: TurnState::NoGame,
        codec,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
