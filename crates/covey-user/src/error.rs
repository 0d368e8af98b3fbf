//! Error types for the user layer.

use covey_protocol::UserId;

/// Errors that can occur during user registry operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user {0} not found")]
    NotFound(UserId),

    /// The user token did not match, or the user already has a live
    /// notification channel.
    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    Validation(String),
}
