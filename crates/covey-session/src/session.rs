//! Session types: the server's record of a player's credential.
//!
//! A session is created together with a player when a join request
//! succeeds. It tracks:
//! - WHO it belongs to (`PlayerId`)
//! - WHAT state it's in (issued, bound)
//! - the secret token the client must present to bind a channel

use covey_protocol::PlayerId;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
///   Issued ──(bind)──→ Bound ──(release)──→ [removed]
///     │                                        ↑
///     └──────────────(release)─────────────────┘
/// ```
///
/// - **Issued**: the player joined the town but has no channel yet.
/// - **Bound**: a channel presented the token and is now tied to the
///   player. The token cannot be used again.
///
/// There is no "released" state: releasing removes the session, so a
/// stale token simply stops matching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the player's channel.
    Issued,

    /// Tied to a live channel.
    Bound,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single player's session inside one town. Never renewed.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which player this session belongs to.
    pub player_id: PlayerId,

    /// Current lifecycle state.
    pub state: SessionState,

    /// The opaque token handed to the client on join.
    pub token: String,
}
