//! `WebSocket` handler for live status streaming.
//!
//! Clients connect to `GET /ws/status`. The first frame carries the
//! current status from the snapshot, so a client does not wait a full
//! poll interval for data. After that each successful poll pushes a
//! JSON-encoded [`StatusBroadcast`]. A lagging client is resynced with
//! the current status instead of replaying the missed messages.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, StatusBroadcast};

/// Upgrade to a `WebSocket` and stream status messages.
///
/// # Route
///
/// `GET /ws/status`
pub async fn ws_status(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Status frame for a client that has just connected or fell behind.
///
/// `None` until the first sample has been published.
pub async fn current_status(state: &AppState) -> Option<StatusBroadcast> {
    state.snapshot.read().await.status_message()
}

/// Send a status message, if there is one. Returns `false` once the
/// client is gone.
async fn send_status(socket: &mut WebSocket, message: Option<&StatusBroadcast>) -> bool {
    let Some(message) = message else {
        return true;
    };
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize status broadcast: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the snapshot so no poll falls in between.
    let mut rx = state.subscribe();

    let first = current_status(&state).await;
    if !send_status(&mut socket, first.as_ref()).await {
        debug!("WebSocket client disconnected (send failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                let message = match result {
                    Ok(message) => Some(message),
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, resyncing");
                        rx = rx.resubscribe();
                        current_status(&state).await
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                };
                if !send_status(&mut socket, message.as_ref()).await {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Client text and binary frames are ignored.
                    _ => {}
                }
            }
        }
    }
}
