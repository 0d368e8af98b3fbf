//! Active users.

use covey_protocol::{UserId, UserSummary};
use covey_session::{generate_id, generate_token, ID_LENGTH};

/// An identity in the user registry.
///
/// Usernames are not keys: any number of users may share one. The id
/// and token are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUser {
    pub id: UserId,
    pub username: String,
    /// Credential for binding the notification channel.
    pub token: String,
}

impl ActiveUser {
    /// Creates a user with a fresh id and token.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(generate_id(ID_LENGTH)),
            username: username.into(),
            token: generate_token(),
        }
    }

    /// The public view of this user. Never includes the token.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            user_id: self.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_same_username_distinct_id_and_token() {
        let a = ActiveUser::new("ada");
        let b = ActiveUser::new("ada");

        assert_ne!(a.id, b.id);
        assert_ne!(a.token, b.token);
        assert_eq!(a.id.as_str().len(), ID_LENGTH);
    }

    #[test]
    fn test_summary_omits_token() {
        let user = ActiveUser::new("grace");
        let summary = user.summary();

        assert_eq!(summary.user_id, user.id);
        assert_eq!(summary.username, "grace");
    }
}
