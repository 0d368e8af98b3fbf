//! Town lifecycle management for Covey.
//!
//! Each town runs as an isolated Tokio task (actor model) that owns its
//! roster, its sessions, and the outbound channel of every bound player.
//! All reads and writes of a town's state happen inside that task, so a
//! capacity check + append, a token check + bind, or a roster update +
//! broadcast is atomic with respect to everything else aimed at the same
//! town.
//!
//! # Key types
//!
//! - [`TownRegistry`]: creates/deletes/lists towns, resolves ids and
//!   invitation ids to handles
//! - [`TownHandle`]: sends commands to a running town actor
//! - [`TownConfig`]: per-town settings (capacity)
//! - [`Player`]: a participant owned by exactly one town

mod config;
mod error;
mod player;
mod registry;
mod town;

pub use config::TownConfig;
pub use error::TownError;
pub use player::Player;
pub use registry::{CreatedTown, TownRegistry};
pub use town::{JoinedTown, TownHandle, TownInfo, TownSender};
