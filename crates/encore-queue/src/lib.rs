// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue engine for the Encore request queue.
//!
//! - [`engine`]: pure ordering and state-machine rules. Given the current
//!   orders it computes a [`Changeset`](encore_core::Changeset) and never
//!   touches storage itself.
//! - [`notifications`]: bounded, newest-first log of guest edits and cancellations.
//! - [`broadcast`]: fan-out of [`QueueEvent`](encore_core::QueueEvent)s to every observer.
//! - [`service`]: [`QueueService`], which serializes commands, commits
//!   changesets, and publishes events.

pub mod broadcast;
pub mod engine;
pub mod ids;
pub mod notifications;
pub mod service;

pub use broadcast::Broadcaster;
pub use engine::{NewOrder, OrderEdit, Outcome, QueueEngine};
pub use notifications::NotificationLog;
pub use service::{HealthReport, QueueService};
