//! WebSocket connection handling
//!
//! Each socket is split in two: this task reads frames and feeds them to the
//! gateway, while a spawned writer drains the connection's outbound queue.
//! The writer is the only place that awaits the socket, so a peer that stops
//! reading only backs up its own queue.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use parley_core::{Handshake, Outbound, ServerMessage};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error};

use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let handshake = Handshake {
        websocket_key: headers
            .get(header::SEC_WEBSOCKET_KEY)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, handshake))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, handshake: Handshake) {
    let (sender, mut receiver) = socket.split();
    let (outbound, outbound_rx) = Outbound::channel();
    let gateway = &state.gateway;

    let mut conn = gateway.on_connect(&handshake, outbound);
    tokio::spawn(write_outbound(sender, outbound_rx));

    let mut close_reason = None;
    while let Some(msg) = receiver.next().await {
        match msg {
            // Failures are logged by the gateway and never close the socket
            Ok(Message::Text(text)) => {
                let _ = gateway.on_message(&mut conn, text.as_bytes()).await;
            }
            Ok(Message::Binary(data)) => {
                let _ = gateway.on_message(&mut conn, &data).await;
            }
            Ok(Message::Close(frame)) => {
                debug!("WebSocket client sent close frame");
                close_reason = frame.map(|f| f.reason.to_string());
                break;
            }
            Ok(_) => {
                // Ping/pong are answered by the protocol layer
            }
            Err(e) => {
                gateway.on_error(&conn, &e);
                break;
            }
        }
    }

    gateway.on_close(&mut conn, close_reason.as_deref()).await;
}

/// Forward queued envelopes to the socket until every sender is gone
async fn write_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: UnboundedReceiver<ServerMessage>,
) {
    while let Some(msg) = rx.recv().await {
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to encode envelope: {}", e);
                continue;
            }
        };
        if let Err(e) = sender.send(Message::Text(json.into())).await {
            debug!("WebSocket send failed: {}", e);
            break;
        }
    }
    let _ = sender.close().await;
}
