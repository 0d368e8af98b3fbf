//! Players: the participants of a town.

use covey_protocol::{PlayerId, PlayerInfo, UserLocation};
use covey_session::{generate_id, ID_LENGTH};

/// A participant bound to exactly one town.
///
/// Created when a join request succeeds and destroyed when its channel
/// closes or the town is deleted. Usernames are not unique within a town.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub location: UserLocation,
}

impl Player {
    /// Creates a player with a fresh id at the default location.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(generate_id(ID_LENGTH)),
            username: username.into(),
            location: UserLocation::default(),
        }
    }

    /// The view of this player that other players receive.
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id.clone(),
            username: self.username.clone(),
            location: self.location,
        }
    }
}
