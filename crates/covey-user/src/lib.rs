//! The Covey user registry.
//!
//! Users are identities independent of any town. A user opens one
//! long-lived notification channel; invitations reach them through it.
//! Losing that channel deletes the user.
//!
//! The registry depends on [`covey_town::TownRegistry`] only to look up a
//! town's display name when routing an invitation. Nothing in the town
//! layer knows about users.

mod error;
mod listener;
mod registry;
mod user;

pub use error::UserError;
pub use listener::{InvitationListener, UserSender};
pub use registry::UserRegistry;
pub use user::ActiveUser;
