//! Realtime channel events.
//!
//! Every frame on a town or user channel is a JSON object of the form
//! `{ "event": <name>, "data": <payload> }`. Serde's "adjacently tagged"
//! representation (`tag = "event", content = "data"`) produces exactly
//! that shape.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, PlayerInfo, TownId, UserLocation};

/// Server → client events on a town channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum TownEvent {
    /// Another player bound a channel to this town.
    NewPlayer(PlayerInfo),

    /// Another player moved. Never echoed to the mover.
    PlayerMoved {
        id: PlayerId,
        location: UserLocation,
    },

    /// Another player's channel closed; they have left the town.
    PlayerDisconnect { id: PlayerId },
}

/// Client → server events on a town channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum TownInbound {
    /// The sender's new location.
    PlayerMovement(UserLocation),
}

/// Server → client events on a user notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum UserEvent {
    /// The user was invited to a town.
    InvitedToTown {
        #[serde(rename = "coveyTownID")]
        covey_town_id: TownId,
        #[serde(rename = "friendlyName")]
        friendly_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn test_new_player_json_format() {
        let event = TownEvent::NewPlayer(PlayerInfo {
            id: PlayerId::from("p1"),
            username: "ada".into(),
            location: UserLocation::default(),
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "newPlayer");
        assert_eq!(json["data"]["id"], "p1");
        assert_eq!(json["data"]["username"], "ada");
    }

    #[test]
    fn test_player_moved_json_format() {
        let event = TownEvent::PlayerMoved {
            id: PlayerId::from("p2"),
            location: UserLocation {
                x: 4.0,
                y: 8.0,
                rotation: Direction::Back,
                moving: true,
            },
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "playerMoved");
        assert_eq!(json["data"]["id"], "p2");
        assert_eq!(json["data"]["location"]["x"], 4.0);
        assert_eq!(json["data"]["location"]["rotation"], "back");
    }

    #[test]
    fn test_player_disconnect_json_format() {
        let event = TownEvent::PlayerDisconnect { id: PlayerId::from("p3") };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "playerDisconnect");
        assert_eq!(json["data"]["id"], "p3");
    }

    #[test]
    fn test_invited_to_town_json_format() {
        let event = UserEvent::InvitedToTown {
            covey_town_id: TownId::from("T1"),
            friendly_name: "Main Street".into(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "invitedToTown");
        assert_eq!(json["data"]["coveyTownID"], "T1");
        assert_eq!(json["data"]["friendlyName"], "Main Street");
    }

    #[test]
    fn test_inbound_unknown_event_is_rejected() {
        let raw = r#"{"event":"teleport","data":{}}"#;
        let result: Result<TownInbound, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }
}
