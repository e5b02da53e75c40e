// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use encore_config::model::ServerConfig;
use encore_core::EncoreError;
use encore_queue::QueueService;

use crate::handlers;
use crate::sse;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub queue: Arc<QueueService>,
    /// Cancelled at shutdown; ends long-lived WebSocket and SSE streams.
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(queue: Arc<QueueService>, shutdown: CancellationToken) -> Self {
        Self { queue, shutdown }
    }
}

/// Build the application router.
///
/// Routes:
/// - GET/POST /orders, GET/PATCH/DELETE /orders/{id}
/// - PATCH /orders/{id}/status, PATCH /orders/{id}/dj-note
/// - DELETE /orders/table/{table_id}, POST /orders/reorder, DELETE /orders/all
/// - GET/DELETE /notifications, GET /history, GET /health
/// - GET /ws (WebSocket), GET /events (SSE)
pub fn router(state: GatewayState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/orders/all", delete(handlers::reset_all))
        .route("/orders/reorder", post(handlers::reorder_orders))
        .route("/orders/table/{table_id}", delete(handlers::clear_table))
        .route(
            "/orders/{id}",
            get(handlers::get_order)
                .patch(handlers::edit_order)
                .delete(handlers::delete_order),
        )
        .route("/orders/{id}/status", patch(handlers::set_status))
        .route("/orders/{id}/dj-note", patch(handlers::set_dj_note))
        .route(
            "/notifications",
            get(handlers::list_notifications).delete(handlers::clear_notifications),
        )
        .route("/history", get(handlers::list_history))
        .route("/health", get(handlers::health))
        .route("/ws", get(ws::ws_handler))
        .route("/events", get(sse::events_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind the configured address and serve until the state's shutdown token is cancelled.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), EncoreError> {
    let shutdown = state.shutdown.clone();
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| EncoreError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;
    serve(listener, router(state, config), shutdown).await
}

/// Serve `app` on an already bound listener until `shutdown` is cancelled.
///
/// In-flight requests finish first. Realtime streams end on the same token
/// through [`GatewayState::shutdown`].
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), EncoreError> {
    let addr = listener
        .local_addr()
        .map_err(|e| EncoreError::Internal(format!("listener has no local address: {e}")))?;
    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| EncoreError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
