// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard WebSocket: each socket is a [`BroadcastHub`] observer.
//!
//! [`BroadcastHub`]: crate::hub::BroadcastHub

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::hub::{Observer, PushError, PushFuture};
use crate::state::GatewayState;

/// Upper bound for the server-initiated close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Write half of a dashboard socket.
struct WsObserver {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    /// Cancelled when the hub drops this observer.
    removed: CancellationToken,
}

impl WsObserver {
    /// Send a Close frame so the client notices it must reconnect.
    async fn close(&self) {
        let sent = tokio::time::timeout(CLOSE_TIMEOUT, async {
            self.sink.lock().await.send(Message::Close(None)).await
        })
        .await;
        if !matches!(sent, Ok(Ok(()))) {
            tracing::debug!("dashboard close frame not delivered");
        }
    }
}

impl Observer for WsObserver {
    fn push(&self, frame: Arc<str>) -> PushFuture<'_> {
        Box::pin(async move {
            let mut sink = self.sink.lock().await;
            sink.send(Message::Text(frame.as_ref().into()))
                .await
                .map_err(|e| PushError::Transport(e.to_string()))
        })
    }

    fn on_removed(&self) {
        self.removed.cancel();
    }
}

/// `GET /dashboard/{client_id}`: WebSocket upgrade for the fleet feed.
pub async fn dashboard_ws(
    State(state): State<Arc<GatewayState>>,
    Path(client_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_dashboard(state, client_id, socket))
}

/// Per-connection loop: the hub writes, this task watches for the client
/// closing, the hub dropping the observer, or shutdown.
async fn handle_dashboard(state: Arc<GatewayState>, client_id: String, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Initial snapshot so a fresh dashboard does not wait a full tick.
    if let Ok(json) = serde_json::to_string(&state.registry.snapshot()) {
        if ws_tx.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    let observer =
        Arc::new(WsObserver { sink: Mutex::new(ws_tx), removed: CancellationToken::new() });
    let ticket = state.hub.connect(&client_id, Arc::clone(&observer) as Arc<dyn Observer>);
    tracing::info!(observer = %client_id, "dashboard connected");

    let mut server_close = false;
    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                server_close = true;
                break;
            }
            _ = observer.removed.cancelled() => {
                tracing::debug!(observer = %client_id, "dropped by hub, closing socket");
                server_close = true;
                break;
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(observer = %client_id, err = %e, "dashboard socket error");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let removed = state.hub.detach(&ticket);
    if server_close {
        observer.close().await;
    }
    tracing::info!(observer = %client_id, removed, "dashboard disconnected");
}
