// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast-all fan-out of queue events.
//!
//! There are no topics and no per-client filtering: every observer receives
//! every event. Publishing is fire-and-forget.

use encore_core::QueueEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Cloneable handle for publishing and subscribing to queue events.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<QueueEvent>,
}

impl Broadcaster {
    /// `capacity` is the per-observer buffer; slower observers skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to every current observer. Returns how many received it.
    pub fn publish(&self, event: QueueEvent) -> usize {
        let name = event.name();
        // Err only means nobody is listening.
        let delivered = self.tx.send(event).unwrap_or(0);
        debug!(event = name, observers = delivered, "event published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
