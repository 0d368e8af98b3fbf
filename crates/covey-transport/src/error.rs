use std::io;
use std::time::Duration;

/// Failures of a realtime channel or its listener.
///
/// WebSocket protocol errors are kept as text so this type does not depend
/// on the optional `websocket` feature.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("tcp accept failed: {0}")]
    Accept(#[source] io::Error),

    /// The peer connected but the WebSocket upgrade did not complete.
    #[error("websocket upgrade failed: {0}")]
    Upgrade(String),

    /// The peer connected but sent no complete upgrade request in time.
    #[error("websocket upgrade did not finish within {0:?}")]
    UpgradeTimeout(Duration),

    #[error("write to channel failed: {0}")]
    Write(String),

    #[error("read from channel failed: {0}")]
    Read(String),
}
