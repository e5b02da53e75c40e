// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `encore serve` command implementation.
//!
//! Opens the configured store, builds the queue service, and serves the
//! gateway until SIGINT/SIGTERM. The store is closed (WAL checkpoint) after
//! the server stops.

use std::sync::Arc;

use encore_config::model::EncoreConfig;
use encore_core::EncoreError;
use encore_gateway::GatewayState;
use encore_queue::QueueService;
use tracing::{error, info};

use crate::shutdown;

pub async fn run_serve(config: EncoreConfig) -> Result<(), EncoreError> {
    init_tracing(&config.logging.level);
    info!(version = env!("CARGO_PKG_VERSION"), "starting encore");

    let store = encore_storage::open_store(&config.storage).await?;
    let queue = Arc::new(QueueService::new(Arc::clone(&store), &config.queue).await?);
    info!(
        backend = store.name(),
        notification_capacity = config.queue.notification_capacity,
        "queue service ready"
    );

    let cancel = shutdown::install_signal_handler();
    let state = GatewayState::new(queue, cancel);
    let served = encore_gateway::start_server(&config.server, state).await;

    if let Err(e) = store.close().await {
        error!(error = %e, "failed to close store cleanly");
    }
    info!("encore stopped");
    served
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("encore={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
