//! Per-connection handler: handshake auth and event routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Pick the channel class from the handshake path (`/town`, `/user`)
//!   2. Bind the connection using the handshake's credentials; on any
//!      failure close it without sending anything
//!   3. Loop: forward outbound events, decode inbound frames, until
//!      either side closes

use std::sync::Arc;

use covey_protocol::{Codec, PlayerId, TownId, TownInbound, UserId};
use covey_town::TownHandle;
use covey_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::{CoveyError, SharedState};

/// Drop guard that removes a player from their town when the handler
/// exits.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// actor round-trip.
struct PlayerGuard {
    player_id: PlayerId,
    town: TownHandle,
}

impl Drop for PlayerGuard {
    fn drop(&mut self) {
        let player_id = self.player_id.clone();
        let town = self.town.clone();
        tokio::spawn(async move {
            // Fails only if the town is already gone.
            let _ = town.disconnect(player_id).await;
        });
    }
}

/// Drop guard that deletes a user when their notification channel closes.
struct UserGuard {
    user_id: UserId,
    state: SharedState,
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        let user_id = self.user_id.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.users.lock().await.delete_user(&user_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: SharedState,
) -> Result<(), CoveyError> {
    let conn_id = conn.id();
    let path = conn.handshake().path().to_string();
    tracing::debug!(%conn_id, %path, "handling new connection");

    match path.as_str() {
        "/town" => handle_town_channel(conn, state).await,
        "/user" => handle_user_channel(conn, state).await,
        _ => reject(&conn, "unknown channel path").await,
    }
}

async fn handle_town_channel(
    conn: WebSocketConnection,
    state: SharedState,
) -> Result<(), CoveyError> {
    let conn_id = conn.id();
    let handshake = conn.handshake();
    let (Some(token), Some(town_id)) =
        (handshake.param("token"), handshake.param("coveyTownID"))
    else {
        return reject(&conn, "missing town channel credentials").await;
    };
    let token = token.to_string();
    let town_id = TownId::from(town_id);

    let Some(town) = state.towns.lock().await.town(&town_id) else {
        return reject(&conn, "unknown town").await;
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let player_id = match town.connect(&token, tx).await {
        Ok(player_id) => player_id,
        Err(e) => {
            tracing::debug!(%conn_id, %town_id, error = %e, "town channel bind rejected");
            return reject(&conn, "invalid session token").await;
        }
    };
    tracing::info!(%conn_id, %town_id, %player_id, "town channel bound");

    let _guard = PlayerGuard {
        player_id: player_id.clone(),
        town: town.clone(),
    };

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    // The town dropped our sender: deleted, or we were removed.
                    tracing::info!(%conn_id, %player_id, "town closed channel");
                    conn.close().await?;
                    break;
                };
                let bytes = state.codec.encode(&event)?;
                conn.send(&bytes).await?;
            }
            frame = conn.recv() => {
                let data = match frame {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, %player_id, "town channel closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, %player_id, error = %e, "recv error");
                        break;
                    }
                };

                match state.codec.decode::<TownInbound>(&data) {
                    Ok(TownInbound::PlayerMovement(location)) => {
                        town.move_player(player_id.clone(), location).await?;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %conn_id, %player_id, error = %e, "failed to decode frame"
                        );
                    }
                }
            }
        }
    }

    // _guard drops here → player removal fires.
    Ok(())
}

async fn handle_user_channel(
    conn: WebSocketConnection,
    state: SharedState,
) -> Result<(), CoveyError> {
    let conn_id = conn.id();
    let handshake = conn.handshake();
    let (Some(token), Some(user_id)) =
        (handshake.param("token"), handshake.param("userID"))
    else {
        return reject(&conn, "missing user channel credentials").await;
    };
    let user_id = UserId::from(user_id);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let bound = state.users.lock().await.connect(&user_id, token, tx);
    if let Err(e) = bound {
        tracing::debug!(%conn_id, %user_id, error = %e, "user channel bind rejected");
        return reject(&conn, "invalid user credentials").await;
    }

    let _guard = UserGuard {
        user_id: user_id.clone(),
        state: Arc::clone(&state),
    };

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    tracing::info!(%conn_id, %user_id, "user removed, closing channel");
                    conn.close().await?;
                    break;
                };
                let bytes = state.codec.encode(&event)?;
                conn.send(&bytes).await?;
            }
            frame = conn.recv() => match frame {
                // Nothing is expected inbound on a user channel.
                Ok(Some(_)) => {
                    tracing::debug!(%conn_id, %user_id, "ignoring inbound frame");
                }
                Ok(None) => {
                    tracing::info!(%conn_id, %user_id, "user channel closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, %user_id, error = %e, "recv error");
                    break;
                }
            },
        }
    }

    // _guard drops here → the user is deleted.
    Ok(())
}

/// Closes a connection that failed authentication. Nothing is sent
/// besides the close frame.
async fn reject(conn: &WebSocketConnection, reason: &str) -> Result<(), CoveyError> {
    tracing::debug!(conn_id = %conn.id(), reason, "rejecting connection");
    conn.close().await?;
    Ok(())
}
