//! Invitation listeners: the server side of a user's notification channel.

use covey_protocol::{TownId, UserEvent, UserId};
use tokio::sync::mpsc;

/// Channel sender for delivering user events to one notification channel.
///
/// Dropping it closes the channel; that is the listener's disconnect.
pub type UserSender = mpsc::UnboundedSender<UserEvent>;

/// Binds a user to their live notification channel.
#[derive(Debug)]
pub struct InvitationListener {
    user_id: UserId,
    sender: UserSender,
}

impl InvitationListener {
    pub fn new(user_id: UserId, sender: UserSender) -> Self {
        Self { user_id, sender }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Pushes an `invitedToTown` event to the user.
    ///
    /// Returns `false` if the channel has already gone away.
    pub fn on_invited(&self, town_id: TownId, friendly_name: String) -> bool {
        self.sender
            .send(UserEvent::InvitedToTown {
                covey_town_id: town_id,
                friendly_name,
            })
            .is_ok()
    }

    /// Returns `true` while the receiving end is alive.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_invited_delivers_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = InvitationListener::new(UserId::from("u1"), tx);

        assert!(listener.on_invited(TownId::from("T1"), "Main".into()));

        assert_eq!(
            rx.try_recv().unwrap(),
            UserEvent::InvitedToTown {
                covey_town_id: TownId::from("T1"),
                friendly_name: "Main".into(),
            }
        );
    }

    #[test]
    fn test_on_invited_after_receiver_dropped_returns_false() {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = InvitationListener::new(UserId::from("u1"), tx);
        drop(rx);

        assert!(!listener.is_connected());
        assert!(!listener.on_invited(TownId::from("T1"), "Main".into()));
    }

    #[test]
    fn test_drop_listener_closes_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = InvitationListener::new(UserId::from("u1"), tx);

        drop(listener);

        assert!(rx.try_recv().is_err());
        assert!(rx.is_closed());
    }
}
