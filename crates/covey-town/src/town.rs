//! Town actor: an isolated Tokio task that owns one town's state.
//!
//! Each town runs in its own task, communicating with the outside world
//! through an mpsc channel. No shared mutable state, just message passing.
//!
//! Per player the actor drives this state machine:
//!
//! ```text
//! unjoined ──(add_player)──→ joined-no-channel ──(connect ok)──→ connected
//!                                   │                               │
//!                        (connect rejected, or               (disconnect)
//!                         town deleted)                            │
//!                                   ▼                               ▼
//!                             disconnected ◄────────────────────────┘
//! ```

use std::collections::HashMap;

use covey_protocol::{InvitationId, PlayerId, PlayerInfo, TownEvent, TownId, UserLocation};
use covey_session::SessionManager;
use tokio::sync::{mpsc, oneshot};

use crate::{Player, TownError};

/// Channel sender for delivering town events to one bound player.
///
/// Dropping the sender is how the town closes the player's channel.
pub type TownSender = mpsc::UnboundedSender<TownEvent>;

/// Everything a client needs after a successful join.
#[derive(Debug, Clone)]
pub struct JoinedTown {
    /// The new player.
    pub player: PlayerInfo,
    /// The one-time token that binds the player's channel.
    pub session_token: String,
    /// Every player in the roster, the new one included.
    pub current_players: Vec<PlayerInfo>,
    pub friendly_name: String,
    pub is_publicly_listed: bool,
}

/// A snapshot of town metadata.
#[derive(Debug, Clone)]
pub struct TownInfo {
    pub town_id: TownId,
    pub invitation_id: InvitationId,
    pub friendly_name: String,
    pub is_publicly_listed: bool,
    /// Number of players in the roster.
    pub occupancy: usize,
    pub capacity: usize,
    pub players: Vec<PlayerInfo>,
}

/// Commands sent to a town actor through its channel.
///
/// The `oneshot::Sender` in some variants is a "reply channel"; the
/// caller sends a command and waits for the response on that channel.
pub(crate) enum TownCommand {
    AddPlayer {
        username: String,
        reply: oneshot::Sender<Result<JoinedTown, TownError>>,
    },

    Connect {
        token: String,
        sender: TownSender,
        reply: oneshot::Sender<Result<PlayerId, TownError>>,
    },

    Move {
        player_id: PlayerId,
        location: UserLocation,
    },

    Disconnect {
        player_id: PlayerId,
    },

    GetInfo {
        reply: oneshot::Sender<TownInfo>,
    },

    Update {
        password: String,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
        reply: oneshot::Sender<bool>,
    },

    /// Stops the actor if `password` matches, closing every bound channel.
    Delete {
        password: String,
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to a running town actor. Used to send commands to it.
///
/// Cheap to clone; it's an `mpsc::Sender` plus the two immutable ids.
#[derive(Clone)]
pub struct TownHandle {
    town_id: TownId,
    invitation_id: InvitationId,
    sender: mpsc::Sender<TownCommand>,
}

impl TownHandle {
    /// Returns the town's id.
    pub fn town_id(&self) -> &TownId {
        &self.town_id
    }

    /// Returns the town's invitation id. Stable for the town's lifetime.
    pub fn invitation_id(&self) -> &InvitationId {
        &self.invitation_id
    }

    /// Adds a player to the roster and issues their session.
    ///
    /// Does not bind any channel; the client does that with
    /// [`connect`](Self::connect) and the returned token.
    pub async fn add_player(
        &self,
        username: &str,
    ) -> Result<JoinedTown, TownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TownCommand::AddPlayer {
            username: username.to_string(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Binds `sender` to the player whose session token is `token`.
    ///
    /// On rejection the sender is dropped, which the caller observes as
    /// its channel closing.
    pub async fn connect(
        &self,
        token: &str,
        sender: TownSender,
    ) -> Result<PlayerId, TownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TownCommand::Connect {
            token: token.to_string(),
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Reports a bound player's new location (fire-and-forget).
    pub async fn move_player(
        &self,
        player_id: PlayerId,
        location: UserLocation,
    ) -> Result<(), TownError> {
        self.send(TownCommand::Move {
            player_id,
            location,
        })
        .await
    }

    /// Reports that a player's channel closed (fire-and-forget).
    ///
    /// This is the single removal path for a connected player.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), TownError> {
        self.send(TownCommand::Disconnect { player_id }).await
    }

    /// Requests the current town info.
    pub async fn info(&self) -> Result<TownInfo, TownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TownCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Updates the provided fields if `password` matches.
    pub async fn update(
        &self,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> Result<bool, TownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TownCommand::Update {
            password: password.to_string(),
            friendly_name,
            is_publicly_listed,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Shuts the town down if `password` matches.
    pub(crate) async fn delete(&self, password: &str) -> Result<bool, TownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TownCommand::Delete {
            password: password.to_string(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    async fn send(&self, cmd: TownCommand) -> Result<(), TownError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> TownError {
        TownError::Unavailable(self.town_id.clone())
    }
}

/// The internal town actor state. Runs inside a Tokio task.
struct TownActor {
    town_id: TownId,
    invitation_id: InvitationId,
    friendly_name: String,
    is_publicly_listed: bool,
    update_password: String,
    capacity: usize,
    /// The roster, in join order.
    players: Vec<Player>,
    sessions: SessionManager,
    /// Outbound channels of players that are currently connected.
    channels: HashMap<PlayerId, TownSender>,
    receiver: mpsc::Receiver<TownCommand>,
}

impl TownActor {
    /// Runs the actor loop, processing commands until deletion.
    async fn run(mut self) {
        tracing::info!(town_id = %self.town_id, "town actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                TownCommand::AddPlayer { username, reply } => {
                    let _ = reply.send(self.handle_add_player(username));
                }
                TownCommand::Connect {
                    token,
                    sender,
                    reply,
                } => {
                    let _ = reply.send(self.handle_connect(&token, sender));
                }
                TownCommand::Move {
                    player_id,
                    location,
                } => {
                    self.handle_move(player_id, location);
                }
                TownCommand::Disconnect { player_id } => {
                    self.handle_disconnect(player_id);
                }
                TownCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                TownCommand::Update {
                    password,
                    friendly_name,
                    is_publicly_listed,
                    reply,
                } => {
                    let updated = self.handle_update(
                        &password,
                        friendly_name,
                        is_publicly_listed,
                    );
                    let _ = reply.send(updated);
                }
                TownCommand::Delete { password, reply } => {
                    if password != self.update_password {
                        let _ = reply.send(false);
                        continue;
                    }
                    self.close_all();
                    let _ = reply.send(true);
                    break;
                }
            }
        }

        tracing::info!(town_id = %self.town_id, "town actor stopped");
    }

    fn handle_add_player(
        &mut self,
        username: String,
    ) -> Result<JoinedTown, TownError> {
        if self.players.len() >= self.capacity {
            return Err(TownError::Full(self.town_id.clone()));
        }

        let player = Player::new(username);
        let session_token = self.sessions.issue(player.id.clone())?.token.clone();
        let info = player.info();
        self.players.push(player);

        tracing::info!(
            town_id = %self.town_id,
            player_id = %info.id,
            occupancy = self.players.len(),
            "player joined"
        );

        Ok(JoinedTown {
            player: info,
            session_token,
            current_players: self.player_infos(),
            friendly_name: self.friendly_name.clone(),
            is_publicly_listed: self.is_publicly_listed,
        })
    }

    fn handle_connect(
        &mut self,
        token: &str,
        sender: TownSender,
    ) -> Result<PlayerId, TownError> {
        let player_id = match self.sessions.bind(token) {
            Ok(player_id) => player_id,
            Err(e) => {
                // `sender` drops here, closing the caller's channel.
                tracing::debug!(town_id = %self.town_id, error = %e, "channel bind rejected");
                return Err(TownError::Forbidden);
            }
        };

        let Some(player) = self.players.iter().find(|p| p.id == player_id) else {
            let _ = self.sessions.release(&player_id);
            return Err(TownError::Forbidden);
        };
        let info = player.info();

        self.channels.insert(player_id.clone(), sender);
        tracing::info!(town_id = %self.town_id, %player_id, "player connected");

        self.broadcast_except(&player_id, TownEvent::NewPlayer(info));
        Ok(player_id)
    }

    fn handle_move(&mut self, player_id: PlayerId, location: UserLocation) {
        if !self.sessions.is_bound(&player_id) {
            tracing::warn!(
                town_id = %self.town_id,
                %player_id,
                "movement from unbound player, ignoring"
            );
            return;
        }

        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.location = location;
        }

        self.broadcast_except(
            &player_id,
            TownEvent::PlayerMoved {
                id: player_id.clone(),
                location,
            },
        );
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.channels.remove(&player_id);
        let _ = self.sessions.release(&player_id);

        if self.players.len() == before {
            return;
        }

        tracing::info!(
            town_id = %self.town_id,
            %player_id,
            occupancy = self.players.len(),
            "player disconnected"
        );

        self.broadcast_except(
            &player_id,
            TownEvent::PlayerDisconnect { id: player_id.clone() },
        );
    }

    fn handle_update(
        &mut self,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> bool {
        if password != self.update_password {
            return false;
        }
        if friendly_name.as_deref().is_some_and(str::is_empty) {
            return false;
        }

        if let Some(name) = friendly_name {
            self.friendly_name = name;
        }
        if let Some(listed) = is_publicly_listed {
            self.is_publicly_listed = listed;
        }

        tracing::info!(
            town_id = %self.town_id,
            friendly_name = %self.friendly_name,
            is_publicly_listed = self.is_publicly_listed,
            "town updated"
        );
        true
    }

    /// Drops every outbound channel. No events are sent first.
    fn close_all(&mut self) {
        tracing::info!(
            town_id = %self.town_id,
            channels = self.channels.len(),
            "closing all town channels"
        );
        self.channels.clear();
        self.players.clear();
    }

    /// Sends an event to every bound player except `excluded`. Silently
    /// drops it for receivers that are already gone.
    fn broadcast_except(&self, excluded: &PlayerId, event: TownEvent) {
        for (player_id, sender) in &self.channels {
            if player_id != excluded {
                let _ = sender.send(event.clone());
            }
        }
    }

    fn player_infos(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(Player::info).collect()
    }

    fn info(&self) -> TownInfo {
        TownInfo {
            town_id: self.town_id.clone(),
            invitation_id: self.invitation_id.clone(),
            friendly_name: self.friendly_name.clone(),
            is_publicly_listed: self.is_publicly_listed,
            occupancy: self.players.len(),
            capacity: self.capacity,
            players: self.player_infos(),
        }
    }
}

/// Parameters for a freshly created town.
pub(crate) struct TownSeed {
    pub(crate) town_id: TownId,
    pub(crate) invitation_id: InvitationId,
    pub(crate) friendly_name: String,
    pub(crate) is_publicly_listed: bool,
    pub(crate) update_password: String,
    pub(crate) capacity: usize,
}

/// Spawns a new town actor task and returns a handle to communicate with it.
///
/// `channel_size` controls backpressure; if the channel fills up,
/// senders will wait (bounded channel).
pub(crate) fn spawn_town(seed: TownSeed, channel_size: usize) -> TownHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = TownActor {
        town_id: seed.town_id.clone(),
        invitation_id: seed.invitation_id.clone(),
        friendly_name: seed.friendly_name,
        is_publicly_listed: seed.is_publicly_listed,
        update_password: seed.update_password,
        capacity: seed.capacity,
        players: Vec::new(),
        sessions: SessionManager::new(),
        channels: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    TownHandle {
        town_id: seed.town_id,
        invitation_id: seed.invitation_id,
        sender: tx,
    }
}
