//! Session management for Covey towns.
//!
//! This crate handles the credentials that tie a realtime channel to a
//! player:
//!
//! 1. **Token issuing**: unguessable, URL-safe strings for session
//!    tokens, passwords, and ids ([`generate_token`], [`generate_id`])
//! 2. **Session tracking**: which session token belongs to which player,
//!    and whether it has been bound to a channel yet ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Town / User layers (above)  ← issue sessions on join, bind on connect
//!     ↕
//! Session Layer (this crate)  ← owns tokens and the bind state machine
//!     ↕
//! Protocol Layer (below)      ← provides PlayerId
//! ```

mod error;
mod manager;
mod session;
mod token;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
pub use token::{generate_id, generate_token, ID_LENGTH, TOWN_ID_LENGTH};
