// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events push channel for GET /events.
//!
//! Carries the same events as the WebSocket channel. The SSE event name is
//! the event type and the data is its JSON encoding:
//! ```text
//! event: orders_changed
//! data: {"type":"orders_changed"}
//! ```

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

use encore_core::QueueEvent;

use crate::server::GatewayState;

/// Encode a queue event as an SSE event.
pub fn sse_event(event: &QueueEvent) -> Option<Event> {
    Event::default()
        .event(event.name())
        .json_data(event)
        .inspect_err(|e| tracing::error!(event = event.name(), error = %e, "failed to encode event"))
        .ok()
}

/// GET /events
pub async fn events_handler(
    State(state): State<GatewayState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.queue.subscribe();
    let shutdown = state.shutdown.clone();
    tracing::debug!("sse observer connected");

    let stream = BroadcastStream::new(rx)
        .filter_map(|received| async move {
            match received {
                Ok(event) => sse_event(&event).map(Ok),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "sse observer lagged, skipping events");
                    None
                }
            }
        })
        .take_until(async move { shutdown.cancelled_owned().await });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
