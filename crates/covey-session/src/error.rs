//! Error types for the session layer.

use covey_protocol::PlayerId;

/// Errors that can occur while issuing, binding, or releasing sessions.
///
/// None of these are shown to a client: a failed bind closes the channel
/// without saying why.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The token doesn't match any session the town issued.
    #[error("invalid session token")]
    InvalidToken,

    /// The session was already bound to a live channel.
    /// A session token is good for exactly one bind.
    #[error("session for player {0} is already bound")]
    AlreadyBound(PlayerId),

    /// The player already holds a session.
    #[error("player {0} already has a session")]
    AlreadyIssued(PlayerId),
}
