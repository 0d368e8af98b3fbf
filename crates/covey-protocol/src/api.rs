//! Request and response bodies for the REST surface.
//!
//! Field names follow the JSON the browser client already speaks
//! (`coveyTownID`, `isPubliclyListed`, ...), hence the explicit renames.

use serde::{Deserialize, Serialize};

use crate::{InvitationId, PlayerId, PlayerInfo, TownId, UserId};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Wraps every synchronous response.
///
/// `message` is only present when `is_ok` is false. `response` is only
/// present on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    #[serde(rename = "isOK")]
    pub is_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    /// A successful response carrying `response`.
    pub fn ok(response: T) -> Self {
        Self {
            is_ok: true,
            message: None,
            response: Some(response),
        }
    }

    /// A failed response with a human-readable message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_ok: false,
            message: Some(message.into()),
            response: None,
        }
    }
}

/// An empty JSON object, `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Empty {}

// ---------------------------------------------------------------------------
// Users and invitations
// ---------------------------------------------------------------------------

/// `POST /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateResponse {
    pub username: String,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(rename = "userToken")]
    pub user_token: String,
}

/// A user as listed to other users. Never carries the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    #[serde(rename = "userID")]
    pub user_id: UserId,
}

/// `GET /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
}

/// `GET /invitation/{townID}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationLinkResponse {
    #[serde(rename = "invitationID")]
    pub invitation_id: InvitationId,
}

/// `GET /joinInvitation/{invitationID}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinLinkResponse {
    #[serde(rename = "coveyTownID")]
    pub covey_town_id: TownId,
    #[serde(rename = "friendlyName")]
    pub friendly_name: String,
}

/// `POST /invitation`
///
/// Older clients misspell the town key as `conveyTownID`; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteUserRequest {
    #[serde(rename = "invitedUserID")]
    pub invited_user_id: UserId,
    #[serde(rename = "coveyTownID", alias = "conveyTownID")]
    pub covey_town_id: TownId,
}

// ---------------------------------------------------------------------------
// Towns
// ---------------------------------------------------------------------------

/// `POST /town`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownCreateRequest {
    #[serde(rename = "friendlyName", default)]
    pub friendly_name: String,
    #[serde(rename = "isPubliclyListed", default)]
    pub is_publicly_listed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownCreateResponse {
    #[serde(rename = "coveyTownID")]
    pub covey_town_id: TownId,
    #[serde(rename = "coveyTownPassword")]
    pub covey_town_password: String,
}

/// One row of `GET /town`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownSummary {
    #[serde(rename = "friendlyName")]
    pub friendly_name: String,
    #[serde(rename = "coveyTownID")]
    pub covey_town_id: TownId,
    #[serde(rename = "currentOccupancy")]
    pub current_occupancy: usize,
    #[serde(rename = "maximumOccupancy")]
    pub maximum_occupancy: usize,
}

/// `GET /town`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownListResponse {
    pub towns: Vec<TownSummary>,
}

/// `POST /town/join`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownJoinRequest {
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(rename = "coveyTownID")]
    pub covey_town_id: TownId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownJoinResponse {
    #[serde(rename = "coveyUserID")]
    pub covey_user_id: PlayerId,
    #[serde(rename = "coveySessionToken")]
    pub covey_session_token: String,
    #[serde(rename = "currentPlayers")]
    pub current_players: Vec<PlayerInfo>,
    #[serde(rename = "friendlyName")]
    pub friendly_name: String,
    #[serde(rename = "isPubliclyListed")]
    pub is_publicly_listed: bool,
}

/// `DELETE /town`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownDeleteRequest {
    #[serde(rename = "coveyTownID")]
    pub covey_town_id: TownId,
    #[serde(rename = "coveyTownPassword")]
    pub covey_town_password: String,
}

/// `PATCH /town`
///
/// Absent fields are left untouched: `None` is never read as "set to
/// false" or "set to empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownUpdateRequest {
    #[serde(rename = "coveyTownID")]
    pub covey_town_id: TownId,
    #[serde(rename = "coveyTownPassword")]
    pub covey_town_password: String,
    #[serde(rename = "friendlyName", default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(rename = "isPubliclyListed", default, skip_serializing_if = "Option::is_none")]
    pub is_publicly_listed: Option<bool>,
}
