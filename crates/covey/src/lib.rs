//! # Covey
//!
//! Coordination server for Covey towns.
//!
//! Covey ties the layers together: a REST surface (axum) for creating
//! users and towns, and a WebSocket listener for the two realtime
//! channel classes. Town channels carry movement and presence; user
//! channels carry invitations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covey::prelude::*;
//!
//! # async fn start() -> Result<(), CoveyError> {
//! let server = CoveyServer::builder()
//!     .http_addr("0.0.0.0:8081")
//!     .ws_addr("0.0.0.0:8082")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

pub mod api;
pub mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::CoveyError;
pub use server::{CoveyServer, CoveyServerBuilder, ServerState, SharedState};

/// Convenience re-exports for embedding a Covey server.
pub mod prelude {
    pub use crate::config::{ConfigError, ServerConfig};
    pub use crate::error::CoveyError;
    pub use crate::server::{CoveyServer, CoveyServerBuilder};

    pub use covey_protocol::{
        Direction, PlayerId, TownEvent, TownId, UserEvent, UserId,
        UserLocation,
    };
    pub use covey_town::TownConfig;
}
