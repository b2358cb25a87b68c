//! WebSocket upgrade handler.
//!
//! The socket is accepted unauthenticated; the client must send an
//! `authenticate` event before anything is delivered to it.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use civic_realtime::message::serializer::serialize_outbound;

use crate::state::AppState;

/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Drives one socket from connect to disconnect.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let engine = state.realtime.clone();

    let (handle, mut outbound_rx) = engine.connections.open();
    let conn_id = handle.id;
    let mut shutdown_rx = engine.shutdown_receiver();

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Outbound forwarder
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serialize_outbound(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!(conn_id = %conn_id, error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    engine.connections.handle_inbound(&conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Binary(_))) => {
                    debug!(conn_id = %conn_id, "Ignoring binary frame");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    engine.connections.close(&conn_id);
    outbound_task.abort();

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
