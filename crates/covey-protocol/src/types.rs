//! Core identity and position types shared by every Covey layer.
//!
//! Everything here travels "on the wire" (inside REST bodies or realtime
//! events), so the serde attributes define the exact JSON the browser
//! client sees.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Declares an opaque string identifier.
///
/// Each id is a "newtype wrapper" around `String`, so a `TownId` can
/// never be passed where a `UserId` is expected even though both are
/// strings underneath. `#[serde(transparent)]` keeps the JSON a plain
/// string instead of `{ "0": "..." }`.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrows the raw string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Identifies a town. Globally unique and immutable after creation.
    TownId
}

string_id! {
    /// A stable alias for a town used by join-by-link flows, so a link
    /// never reveals the town id itself.
    InvitationId
}

string_id! {
    /// Identifies a player inside exactly one town.
    PlayerId
}

string_id! {
    /// Identifies an active user in the user registry. Independent of any
    /// town membership.
    UserId
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Which way an avatar is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

/// A player's position on the town map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserLocation {
    pub x: f64,
    pub y: f64,
    pub rotation: Direction,
    pub moving: bool,
}

/// The public view of a player: what other players are told about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub username: String,
    pub location: UserLocation,
}
