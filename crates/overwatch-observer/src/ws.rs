//! `WebSocket` stream of picture changes.
//!
//! `GET /ws/picture` sends each [`PictureChange`] as a JSON text frame. A
//! client that falls more than [`BROADCAST_CAPACITY`] changes behind gets a
//! `{"resync": <missed>}` frame instead of the changes it missed, and
//! should re-read `/api/picture`.
//!
//! [`PictureChange`]: overwatch_sync::PictureChange
//! [`BROADCAST_CAPACITY`]: crate::state::BROADCAST_CAPACITY

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Sent in place of changes a slow client missed.
#[derive(Debug, Serialize)]
struct Resync {
    resync: u64,
}

/// Upgrade to a `WebSocket` and stream picture changes.
pub async fn ws_picture(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_picture(socket, state))
}

async fn stream_picture(mut socket: WebSocket, state: Arc<AppState>) {
    let mut changes = state.subscribe();
    debug!(updates = state.picture().updates, "Picture stream opened");

    loop {
        let open = tokio::select! {
            change = changes.recv() => match change {
                Ok(change) => send_json(&mut socket, &change).await,
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "Picture stream lagged, client told to resync");
                    send_json(&mut socket, &Resync { resync: missed }).await
                }
                Err(RecvError::Closed) => false,
            },
            frame = socket.recv() => answer_client(&mut socket, frame).await,
        };
        if !open {
            break;
        }
    }

    debug!("Picture stream closed");
}

/// Send one JSON frame; false once the client is gone.
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Picture frame not serializable");
            true
        }
    }
}

/// React to a client frame; false once the client is gone. Client data
/// frames carry nothing and are ignored.
async fn answer_client(
    socket: &mut WebSocket,
    frame: Option<Result<Message, axum::Error>>,
) -> bool {
    match frame {
        Some(Ok(Message::Ping(data))) => socket.send(Message::Pong(data)).await.is_ok(),
        Some(Ok(Message::Close(_)) | Err(_)) | None => false,
        Some(Ok(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resync_frame_shape() {
        let json = serde_json::to_string(&Resync { resync: 12 }).unwrap_or_default();
        assert_eq!(json, r#"{"resync":12}"#);
    }
}
