//! `CoveyServer` builder and server loops.
//!
//! This is the entry point for running a Covey server. It ties together
//! all the layers: transport → protocol → session → town/user, and puts
//! the REST surface next to the realtime listener.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use covey_protocol::JsonCodec;
use covey_town::{TownConfig, TownRegistry};
use covey_transport::{PendingConnection, Transport, WebSocketTransport};
use covey_user::UserRegistry;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{api, CoveyError, ServerConfig};

/// State shared by every REST request and realtime connection.
///
/// Lock order: `towns` before `users`. Only invitation delivery needs
/// both.
pub struct ServerState {
    pub(crate) towns: Mutex<TownRegistry>,
    pub(crate) users: Mutex<UserRegistry>,
    pub(crate) codec: JsonCodec,
}

impl ServerState {
    /// Creates empty registries whose towns use `town`.
    pub fn new(town: TownConfig) -> Self {
        Self {
            towns: Mutex::new(TownRegistry::new(town)),
            users: Mutex::new(UserRegistry::new()),
            codec: JsonCodec,
        }
    }
}

/// Server state behind an `Arc`, as handed to handlers and tasks.
pub type SharedState = Arc<ServerState>;

/// Builder for configuring and starting a Covey server.
///
/// # Example
///
/// ```rust,ignore
/// use covey::prelude::*;
///
/// let server = CoveyServer::builder()
///     .http_addr("127.0.0.1:0")
///     .ws_addr("127.0.0.1:0")
///     .town_config(TownConfig { capacity: 10 })
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct CoveyServerBuilder {
    config: ServerConfig,
}

impl CoveyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces every setting with `config`.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address of the REST listener.
    pub fn http_addr(mut self, addr: &str) -> Self {
        self.config.http_addr = addr.to_string();
        self
    }

    /// Sets the address of the realtime listener.
    pub fn ws_addr(mut self, addr: &str) -> Self {
        self.config.ws_addr = addr.to_string();
        self
    }

    /// Sets how long a realtime peer may take to finish its upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn town_config(mut self, town: TownConfig) -> Self {
        self.config.town = town;
        self
    }

    /// Allows cross-origin REST requests from `origins` (comma-separated,
    /// or `*`).
    pub fn cors_allowed_origins(mut self, origins: &str) -> Self {
        self.config.cors_allowed_origins = Some(origins.to_string());
        self
    }

    /// Binds both listeners and assembles the server.
    pub async fn build(self) -> Result<CoveyServer, CoveyError> {
        let http = TcpListener::bind(&self.config.http_addr).await?;
        let transport = WebSocketTransport::bind(&self.config.ws_addr)
            .await?
            .with_handshake_timeout(self.config.handshake_timeout);

        let state = Arc::new(ServerState::new(self.config.town.clone()));

        let mut router = api::router(Arc::clone(&state));
        if let Some(cors) = self
            .config
            .cors_allowed_origins
            .as_deref()
            .and_then(api::cors_layer)
        {
            router = router.layer(cors);
        }

        Ok(CoveyServer {
            http,
            transport,
            router,
            state,
        })
    }
}

impl Default for CoveyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Covey server with both listeners bound.
///
/// Call [`run()`](Self::run) to start serving.
pub struct CoveyServer {
    http: TcpListener,
    transport: WebSocketTransport,
    router: Router,
    state: SharedState,
}

impl CoveyServer {
    /// Creates a new builder.
    pub fn builder() -> CoveyServerBuilder {
        CoveyServerBuilder::new()
    }

    /// Returns the address the REST listener is bound to.
    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http.local_addr()
    }

    /// Returns the address the realtime listener is bound to.
    pub fn ws_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the REST router, sharing this server's state.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serves REST and realtime connections until either listener fails.
    pub async fn run(self) -> Result<(), CoveyError> {
        let CoveyServer {
            http,
            transport,
            router,
            state,
        } = self;
        tracing::info!("Covey server running");

        tokio::select! {
            result = axum::serve(http, router).into_future() => {
                result.map_err(CoveyError::from)
            }
            () = accept_loop(transport, state) => Ok(()),
        }
    }
}

/// Accepts realtime connections forever, one handler task each.
///
/// The WebSocket upgrade runs inside the spawned task, so a peer that
/// stalls mid-handshake only ties up its own task.
async fn accept_loop(mut transport: WebSocketTransport, state: SharedState) {
    loop {
        match transport.accept().await {
            Ok(pending) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let conn = match pending.upgrade().await {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::debug!(error = %e, "websocket upgrade failed");
                            return;
                        }
                    };
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(
                            error = %e,
                            "connection ended with error"
                        );
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
}
