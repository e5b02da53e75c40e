// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket push channel.
//!
//! Server -> Client (JSON), one message per queue event:
//! ```json
//! {"type": "orders_changed"}
//! {"type": "notification_created", "notification": {...}}
//! {"type": "notifications_cleared"}
//! ```
//!
//! Client messages are ignored apart from close frames.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use encore_core::QueueEvent;

use crate::server::GatewayState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Serialize an event into a text frame.
pub fn event_message(event: &QueueEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "failed to encode event");
            None
        }
    }
}

/// Forward queue events to one connected observer until either side goes away.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut events = state.queue.subscribe();
    let shutdown = state.shutdown.clone();
    tracing::debug!(observers = state.queue.broadcaster().observer_count(), "websocket observer connected");

    let sender_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = events.recv() => received,
            };
            match event {
                Ok(event) => {
                    let Some(message) = event_message(&event) else {
                        continue;
                    };
                    if ws_sender.send(message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "websocket observer lagged, skipping events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    sender_task.abort();
    tracing::debug!("websocket observer disconnected");
}
