// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Encore request queue.
//!
//! Exposes the queue commands as a JSON REST API and fans queue events out
//! to every connected observer over WebSocket (`/ws`) and Server-Sent
//! Events (`/events`).

pub mod handlers;
pub mod server;
pub mod sse;
pub mod ws;

pub use server::{GatewayState, router, serve, start_server};
