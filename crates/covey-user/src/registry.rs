//! The user registry: every active user and their notification channel.
//!
//! Like the town registry this is a plain struct; the server wraps it in
//! a mutex. When both registries are needed, the town registry is locked
//! first.

use std::collections::HashMap;

use covey_protocol::{TownId, UserId, UserSummary};
use covey_town::TownRegistry;

use crate::{ActiveUser, InvitationListener, UserError, UserSender};

/// The process-wide directory of active users.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: HashMap<UserId, ActiveUser>,

    /// At most one live listener per user, keyed by user id.
    listeners: HashMap<UserId, InvitationListener>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a user. Usernames need not be unique.
    ///
    /// # Errors
    /// Returns [`UserError::Validation`] if `username` is empty.
    pub fn create_user(&mut self, username: &str) -> Result<ActiveUser, UserError> {
        if username.is_empty() {
            return Err(UserError::Validation("Username must be specified".into()));
        }

        let mut user = ActiveUser::new(username);
        while self.users.contains_key(&user.id) {
            user = ActiveUser::new(username);
        }

        tracing::info!(user_id = %user.id, "user created");
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    /// Lists every user. Tokens are never included.
    pub fn users(&self) -> Vec<UserSummary> {
        self.users.values().map(ActiveUser::summary).collect()
    }

    pub fn user(&self, user_id: &UserId) -> Option<UserSummary> {
        self.users.get(user_id).map(ActiveUser::summary)
    }

    /// Removes a user and closes their notification channel, if any.
    ///
    /// Returns `false` if the user did not exist.
    pub fn delete_user(&mut self, user_id: &UserId) -> bool {
        // Dropping the listener drops its sender.
        self.listeners.remove(user_id);
        let existed = self.users.remove(user_id).is_some();
        if existed {
            tracing::info!(%user_id, "user deleted");
        }
        existed
    }

    /// Binds a notification channel to a user.
    ///
    /// On any error `sender` is dropped, closing the channel.
    ///
    /// # Errors
    /// - [`UserError::NotFound`] if the user does not exist
    /// - [`UserError::Forbidden`] if the token does not match, or a live
    ///   channel is already bound
    pub fn connect(
        &mut self,
        user_id: &UserId,
        token: &str,
        sender: UserSender,
    ) -> Result<(), UserError> {
        let user = self
            .users
            .get(user_id)
            .ok_or_else(|| UserError::NotFound(user_id.clone()))?;
        if user.token != token {
            return Err(UserError::Forbidden);
        }
        if self
            .listeners
            .get(user_id)
            .is_some_and(InvitationListener::is_connected)
        {
            return Err(UserError::Forbidden);
        }

        self.listeners
            .insert(user_id.clone(), InvitationListener::new(user_id.clone(), sender));
        tracing::info!(%user_id, "invitation listener bound");
        Ok(())
    }

    /// Delivers an invitation to `town_id` on the user's channel.
    ///
    /// Returns `false` if the user does not exist, has no live channel,
    /// or the town does not exist.
    pub async fn invite_user(
        &self,
        user_id: &UserId,
        town_id: &TownId,
        towns: &TownRegistry,
    ) -> bool {
        let Some(listener) = self.listeners.get(user_id) else {
            return false;
        };
        let Ok(info) = towns.town_info(town_id).await else {
            return false;
        };

        let delivered = listener.on_invited(town_id.clone(), info.friendly_name);
        if delivered {
            tracing::info!(%user_id, %town_id, "invitation delivered");
        }
        delivered
    }

    /// Returns `true` if the user has a live notification channel.
    pub fn has_listener(&self, user_id: &UserId) -> bool {
        self.listeners
            .get(user_id)
            .is_some_and(InvitationListener::is_connected)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn test_create_user_empty_name_returns_validation_error() {
        let mut users = UserRegistry::new();

        let result = users.create_user("");

        assert!(
            matches!(result, Err(UserError::Validation(ref m)) if m == "Username must be specified")
        );
        assert!(users.is_empty());
    }

    #[test]
    fn test_user_lookup_returns_summary() {
        let mut users = UserRegistry::new();
        let created = users.create_user("ada").unwrap();

        let found = users.user(&created.id).expect("should exist");

        assert_eq!(found.username, "ada");
        assert_eq!(found.user_id, created.id);
        assert!(users.user(&UserId::from("missing")).is_none());
    }

    #[test]
    fn test_connect_unknown_user_returns_not_found() {
        let mut users = UserRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let result = users.connect(&UserId::from("ghost"), "token", tx);

        assert!(matches!(result, Err(UserError::NotFound(_))));
        assert!(rx.is_closed());
    }

    #[test]
    fn test_connect_wrong_token_returns_forbidden_and_closes() {
        let mut users = UserRegistry::new();
        let user = users.create_user("ada").unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        let result = users.connect(&user.id, "wrong", tx);

        assert!(matches!(result, Err(UserError::Forbidden)));
        assert!(rx.is_closed());
        assert!(!users.has_listener(&user.id));
    }

    #[test]
    fn test_connect_second_channel_is_rejected_first_survives() {
        let mut users = UserRegistry::new();
        let user = users.create_user("ada").unwrap();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        users.connect(&user.id, &user.token, tx1).unwrap();

        let result = users.connect(&user.id, &user.token, tx2);

        assert!(matches!(result, Err(UserError::Forbidden)));
        assert!(rx2.is_closed());
        assert!(!rx1.is_closed());
        assert!(users.has_listener(&user.id));
    }

    #[test]
    fn test_connect_after_previous_channel_died_rebinds() {
        let mut users = UserRegistry::new();
        let user = users.create_user("ada").unwrap();
        let (tx1, rx1) = mpsc::unbounded_channel();
        users.connect(&user.id, &user.token, tx1).unwrap();
        drop(rx1);

        let (tx2, rx2) = mpsc::unbounded_channel();
        users.connect(&user.id, &user.token, tx2).unwrap();

        assert!(!rx2.is_closed());
        assert!(users.has_listener(&user.id));
    }

    #[test]
    fn test_delete_user_closes_listener() {
        let mut users = UserRegistry::new();
        let user = users.create_user("ada").unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        users.connect(&user.id, &user.token, tx).unwrap();

        assert!(users.delete_user(&user.id));

        assert!(rx.is_closed());
        assert!(!users.has_listener(&user.id));
        assert!(!users.delete_user(&user.id));
    }
}
