//! The session manager: tracks every session issued by one town.
//!
//! Responsible for:
//! - Issuing a session (and its token) when a player joins
//! - Binding a token to a channel, exactly once
//! - Releasing the session when the player's channel closes
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself; it uses plain
//! `HashMap`s. Each town actor owns one and is the only task that ever
//! touches it, so every token check + bind is atomic with respect to
//! other binds on the same town.

use std::collections::HashMap;

use covey_protocol::PlayerId;

use crate::{generate_token, Session, SessionError, SessionState};

/// Manages all sessions issued by a single town.
///
/// ## Lifecycle
///
/// ```text
/// issue() ──→ bind() ──→ release()
///    │           │            │
///    ▼           ▼            ▼
/// [Issued]    [Bound]     [removed]
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    /// All live sessions, keyed by player ID.
    sessions: HashMap<PlayerId, Session>,

    /// An index from session tokens to player IDs, kept in sync with
    /// `sessions`. A binding client sends a token, never a player id.
    tokens: HashMap<String, PlayerId>,
}

impl SessionManager {
    /// Creates a new, empty session manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a session for a newly joined player.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyIssued`] if the player already holds
    /// a session.
    pub fn issue(
        &mut self,
        player_id: PlayerId,
    ) -> Result<&Session, SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyIssued(player_id));
        }

        let token = generate_token();
        let session = Session {
            player_id: player_id.clone(),
            state: SessionState::Issued,
            token: token.clone(),
        };

        self.tokens.insert(token, player_id.clone());
        tracing::debug!(%player_id, "session issued");

        Ok(self.sessions.entry(player_id).or_insert(session))
    }

    /// Binds a channel to the session identified by `token`.
    ///
    /// Returns the player the token belongs to.
    ///
    /// # Errors
    /// - [`SessionError::InvalidToken`]: token not recognized
    /// - [`SessionError::AlreadyBound`]: token already used by a live channel
    pub fn bind(&mut self, token: &str) -> Result<PlayerId, SessionError> {
        let player_id = self
            .tokens
            .get(token)
            .ok_or(SessionError::InvalidToken)?;

        let session = self
            .sessions
            .get_mut(player_id)
            .ok_or(SessionError::InvalidToken)?;

        match session.state {
            SessionState::Issued => {
                session.state = SessionState::Bound;
                tracing::debug!(%player_id, "session bound");
                Ok(player_id.clone())
            }
            SessionState::Bound => {
                Err(SessionError::AlreadyBound(player_id.clone()))
            }
        }
    }

    /// Releases a player's session. Its token stops matching immediately.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn release(
        &mut self,
        player_id: &PlayerId,
    ) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(player_id)
            .ok_or_else(|| SessionError::NotFound(player_id.clone()))?;
        self.tokens.remove(&session.token);

        tracing::debug!(%player_id, "session released");
        Ok(session)
    }

    /// Looks up a session by player ID.
    #[cfg(test)]
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Returns `true` if the player's session is bound to a channel.
    pub fn is_bound(&self, player_id: &PlayerId) -> bool {
        self.sessions
            .get(player_id)
            .is_some_and(|s| s.state == SessionState::Bound)
    }

    /// Returns the number of live sessions (any state).
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    // =====================================================================
    // issue()
    // =====================================================================

    #[test]
    fn test_issue_new_player_returns_issued_session() {
        let mut mgr = SessionManager::new();

        let session = mgr.issue(pid("a")).expect("should succeed");

        assert_eq!(session.state, SessionState::Issued);
        assert_eq!(session.player_id, pid("a"));
        assert_eq!(session.token.len(), 32);
    }

    #[test]
    fn test_issue_multiple_players_each_gets_unique_token() {
        let mut mgr = SessionManager::new();

        let t1 = mgr.issue(pid("a")).unwrap().token.clone();
        let t2 = mgr.issue(pid("b")).unwrap().token.clone();

        assert_ne!(t1, t2, "tokens must be unique per player");
    }

    #[test]
    fn test_issue_twice_for_same_player_returns_error() {
        let mut mgr = SessionManager::new();
        mgr.issue(pid("a")).unwrap();

        let result = mgr.issue(pid("a"));

        assert!(matches!(result, Err(SessionError::AlreadyIssued(p)) if p == pid("a")));
        assert_eq!(mgr.len(), 1);
    }

    // =====================================================================
    // bind()
    // =====================================================================

    #[test]
    fn test_bind_valid_token_returns_player_and_marks_bound() {
        let mut mgr = SessionManager::new();
        let token = mgr.issue(pid("a")).unwrap().token.clone();

        let player = mgr.bind(&token).expect("should bind");

        assert_eq!(player, pid("a"));
        assert!(mgr.is_bound(&pid("a")));
    }

    #[test]
    fn test_bind_unknown_token_returns_invalid_token() {
        let mut mgr = SessionManager::new();
        mgr.issue(pid("a")).unwrap();

        let result = mgr.bind("not-a-real-token");

        assert!(matches!(result, Err(SessionError::InvalidToken)));
        assert!(!mgr.is_bound(&pid("a")));
    }

    #[test]
    fn test_bind_same_token_twice_returns_already_bound() {
        let mut mgr = SessionManager::new();
        let token = mgr.issue(pid("a")).unwrap().token.clone();
        mgr.bind(&token).unwrap();

        let result = mgr.bind(&token);

        assert!(matches!(result, Err(SessionError::AlreadyBound(p)) if p == pid("a")));
    }

    #[test]
    fn test_bind_token_of_other_player_binds_only_that_player() {
        let mut mgr = SessionManager::new();
        mgr.issue(pid("a")).unwrap();
        let token_b = mgr.issue(pid("b")).unwrap().token.clone();

        assert_eq!(mgr.bind(&token_b).unwrap(), pid("b"));
        assert!(!mgr.is_bound(&pid("a")));
    }

    // =====================================================================
    // release()
    // =====================================================================

    #[test]
    fn test_release_removes_session_and_invalidates_token() {
        let mut mgr = SessionManager::new();
        let token = mgr.issue(pid("a")).unwrap().token.clone();
        mgr.bind(&token).unwrap();

        let released = mgr.release(&pid("a")).expect("should release");

        assert_eq!(released.player_id, pid("a"));
        assert!(mgr.is_empty());
        assert!(matches!(mgr.bind(&token), Err(SessionError::InvalidToken)));
    }

    #[test]
    fn test_release_unbound_session_succeeds() {
        let mut mgr = SessionManager::new();
        mgr.issue(pid("a")).unwrap();

        mgr.release(&pid("a")).expect("issued sessions can be released");
        assert!(mgr.get(&pid("a")).is_none());
    }

    #[test]
    fn test_release_unknown_player_returns_not_found() {
        let mut mgr = SessionManager::new();

        let result = mgr.release(&pid("ghost"));

        assert!(matches!(result, Err(SessionError::NotFound(p)) if p == pid("ghost")));
    }

    #[test]
    fn test_release_leaves_other_sessions_alone() {
        let mut mgr = SessionManager::new();
        mgr.issue(pid("a")).unwrap();
        let token_b = mgr.issue(pid("b")).unwrap().token.clone();

        mgr.release(&pid("a")).unwrap();

        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.bind(&token_b).unwrap(), pid("b"));
    }
}
