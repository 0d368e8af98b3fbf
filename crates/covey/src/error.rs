//! Unified error type for the Covey server.

use covey_protocol::ProtocolError;
use covey_session::SessionError;
use covey_town::TownError;
use covey_transport::TransportError;
use covey_user::UserError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoveyError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// A town-level error (not found, full, forbidden, unavailable).
    #[error(transparent)]
    Town(#[from] TownError),

    #[error(transparent)]
    User(#[from] UserError),

    /// The server configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving a listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use covey_protocol::{TownId, UserId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Upgrade("gone".into());
        let covey_err: CoveyError = err.into();
        assert!(matches!(covey_err, CoveyError::Transport(_)));
        assert!(covey_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let bad = serde_json_error();
        let covey_err: CoveyError = ProtocolError::Decode(bad).into();
        assert!(matches!(covey_err, CoveyError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let covey_err: CoveyError = SessionError::InvalidToken.into();
        assert!(matches!(covey_err, CoveyError::Session(_)));
    }

    #[test]
    fn test_from_town_error() {
        let err = TownError::NotFound(TownId::from("T1"));
        let covey_err: CoveyError = err.into();
        assert!(matches!(covey_err, CoveyError::Town(_)));
        assert!(covey_err.to_string().contains("T1"));
    }

    #[test]
    fn test_from_user_error() {
        let covey_err: CoveyError = UserError::NotFound(UserId::from("u1")).into();
        assert!(matches!(covey_err, CoveyError::User(_)));
    }

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::Invalid {
            var: "COVEY_TOWN_CAPACITY",
            value: "lots".into(),
        };
        let covey_err: CoveyError = err.into();
        assert!(covey_err.to_string().contains("COVEY_TOWN_CAPACITY"));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let covey_err: CoveyError = err.into();
        assert!(matches!(covey_err, CoveyError::Io(_)));
    }

    fn serde_json_error() -> serde_json::Error {
        serde_json::from_str::<u32>("not json").unwrap_err()
    }
}
