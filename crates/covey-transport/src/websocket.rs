//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::Message;

use crate::{
    Connection, ConnectionId, Handshake, PendingConnection, Transport,
    TransportError,
};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// How long a peer may take to send its upgrade request.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Listens for browser clients and upgrades each TCP stream to a WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    /// Binds a listener on `addr`, e.g. `"0.0.0.0:8082"`.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener =
            TcpListener::bind(addr)
                .await
                .map_err(|source| TransportError::Bind {
                    addr: addr.to_string(),
                    source,
                })?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self::from_listener(listener))
    }

    /// Wraps an already-bound listener.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self {
            listener,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets how long [`PendingWebSocket::upgrade`] waits for the peer.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Pending = PendingWebSocket;
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;
        tracing::trace!(%addr, "tcp peer connected");

        Ok(PendingWebSocket {
            stream,
            addr,
            timeout: self.handshake_timeout,
        })
    }
}

/// A TCP peer whose WebSocket upgrade has not run yet.
pub struct PendingWebSocket {
    stream: TcpStream,
    addr: SocketAddr,
    timeout: Duration,
}

impl PendingConnection for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn upgrade(self) -> Result<Self::Connection, Self::Error> {
        let PendingWebSocket {
            stream,
            addr,
            timeout,
        } = self;

        let (ws, handshake) = tokio::time::timeout(timeout, read_upgrade(stream))
            .await
            .map_err(|_| TransportError::UpgradeTimeout(timeout))??;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, path = handshake.path(), "accepted WebSocket connection");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            handshake,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// Runs the server side of the upgrade and keeps the request URI.
async fn read_upgrade(
    stream: TcpStream,
) -> Result<(WsStream, Handshake), TransportError> {
    // The callback runs once, during the upgrade, and records the request
    // URI so credentials never have to travel as messages.
    let mut handshake = None;
    let ws = tokio_tungstenite::accept_hdr_async(
        stream,
        |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let uri = req.uri();
            handshake = Some(Handshake::new(uri.path(), uri.query()));
            Ok(resp)
        },
    )
    .await
    .map_err(|e| TransportError::Upgrade(e.to_string()))?;

    let handshake = handshake.ok_or_else(|| {
        TransportError::Upgrade("upgrade request not seen".into())
    })?;
    Ok((ws, handshake))
}

/// An upgraded client socket.
///
/// The sink and stream halves are locked independently so a task can
/// wait for inbound frames while another pushes outbound events.
pub struct WebSocketConnection {
    id: ConnectionId,
    handshake: Handshake,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::text(text),
            Err(_) => Message::binary(data.to_vec()),
        };
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        while let Some(frame) = stream.next().await {
            let payload = match frame
                .map_err(|e| TransportError::Read(e.to_string()))?
            {
                Message::Text(text) => text.as_bytes().to_vec(),
                Message::Binary(data) => data.to_vec(),
                Message::Close(_) => return Ok(None),
                // Ping and pong are answered by tungstenite itself.
                _ => continue,
            };
            return Ok(Some(payload));
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        match self.sink.lock().await.close().await {
            Ok(())
            | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::Write(e.to_string())),
        }
    }

    fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
