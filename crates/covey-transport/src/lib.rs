//! Transport abstraction layer for Covey realtime channels.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol, plus the [`Handshake`] a client presents when it
//! opens a channel.
//!
//! Credentials travel in the handshake (the upgrade request's query
//! string), never as messages, so a connection is either bound or closed
//! before any frame is exchanged.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod handshake;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use handshake::Handshake;
#[cfg(feature = "websocket")]
pub use websocket::{
    DEFAULT_HANDSHAKE_TIMEOUT, PendingWebSocket, WebSocketConnection,
    WebSocketTransport,
};

use std::fmt;

/// Server-assigned number for one accepted channel, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of realtime channels.
///
/// `accept` hands back the TCP peer as soon as it connects. The upgrade
/// happens later in [`PendingConnection::upgrade`], so the caller can run
/// it on its own task and a stalled peer never holds up the next one.
pub trait Transport: Send + Sync + 'static {
    type Pending: PendingConnection<Connection = Self::Connection>;
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// A peer that has connected but not yet finished the upgrade.
pub trait PendingConnection: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Completes the upgrade. Fails if the peer does not finish it within
    /// the transport's handshake timeout.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// One open realtime channel carrying whole text frames.
///
/// Every method takes `&self`: sending and receiving may run concurrently
/// from the same task, e.g. as two arms of a `select!`.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Next frame payload, or `Ok(None)` once the peer has gone away.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a close frame. Closing twice is not an error.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Path and query of the upgrade request.
    fn handshake(&self) -> &Handshake;

    fn id(&self) -> ConnectionId;
}
