//! Wire protocol for Covey towns.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`TownId`], [`PlayerId`], [`UserLocation`], ...): the
//!   identities and positions shared by every layer.
//! - **Events** ([`TownEvent`], [`TownInbound`], [`UserEvent`]): frames
//!   on the two realtime channel classes.
//! - **API** ([`ResponseEnvelope`] and the request/response bodies):
//!   the REST surface.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are turned
//!   into bytes.
//!
//! The protocol layer doesn't know about connections or towns; it only
//! knows how values look on the wire.

mod api;
mod codec;
mod error;
mod events;
mod types;

pub use api::{
    Empty, InvitationLinkResponse, InviteUserRequest, JoinLinkResponse,
    ResponseEnvelope, TownCreateRequest, TownCreateResponse,
    TownDeleteRequest, TownJoinRequest, TownJoinResponse, TownListResponse,
    TownSummary, TownUpdateRequest, UserCreateRequest, UserCreateResponse,
    UserListResponse, UserSummary,
};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{TownEvent, TownInbound, UserEvent};
pub use types::{
    Direction, InvitationId, PlayerId, PlayerInfo, TownId, UserId,
    UserLocation,
};
