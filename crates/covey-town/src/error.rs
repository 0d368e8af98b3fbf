//! Error types for the town layer.

use covey_protocol::TownId;
use covey_session::SessionError;

/// Errors that can occur during town operations.
#[derive(Debug, thiserror::Error)]
pub enum TownError {
    /// The town does not exist.
    #[error("town {0} not found")]
    NotFound(TownId),

    /// The town is at capacity. No more players can join.
    #[error("town {0} is full")]
    Full(TownId),

    /// A credential (update password or session token) did not match.
    /// Deliberately carries no detail.
    #[error("forbidden")]
    Forbidden,

    /// A required field was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// The session layer refused an operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The town's command channel is closed (it was deleted mid-request).
    #[error("town {0} is unavailable")]
    Unavailable(TownId),
}
