// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full stack (store, queue service, HTTP
//! router) over an in-memory store or a temp SQLite file, and drives it
//! with in-process requests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use encore_config::model::{QueueConfig, ServerConfig, StorageBackend, StorageConfig};
use encore_core::{EncoreError, Order, QueueStore};
use encore_gateway::GatewayState;
use encore_queue::QueueService;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    backend: StorageBackend,
    queue: QueueConfig,
    cors_permissive: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            backend: StorageBackend::Memory,
            queue: QueueConfig::default(),
            cors_permissive: true,
        }
    }

    /// Back the harness with a SQLite file in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = StorageBackend::Sqlite;
        self
    }

    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.queue.notification_capacity = capacity;
        self
    }

    pub fn with_unspecified_artist(mut self, artist: impl Into<String>) -> Self {
        self.queue.unspecified_artist = artist.into();
        self
    }

    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Build the harness, opening the store and wiring the service and router.
    pub async fn build(self) -> Result<TestHarness, EncoreError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| EncoreError::Storage { source: e.into() })?;
        let storage = StorageConfig {
            backend: self.backend,
            database_path: temp_dir
                .path()
                .join("test.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        };
        let store = encore_storage::open_store(&storage).await?;
        let queue = Arc::new(QueueService::new(Arc::clone(&store), &self.queue).await?);

        let shutdown = CancellationToken::new();
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_permissive: self.cors_permissive,
        };
        let router = encore_gateway::router(
            GatewayState::new(Arc::clone(&queue), shutdown.clone()),
            &server,
        );

        Ok(TestHarness {
            store,
            queue,
            router,
            shutdown,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired Encore stack for tests.
pub struct TestHarness {
    pub store: Arc<dyn QueueStore>,
    pub queue: Arc<QueueService>,
    pub router: Router,
    pub shutdown: CancellationToken,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send one request through the router. Empty bodies come back as `Value::Null`.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid test request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        (status, value)
    }

    /// POST /orders and decode the created order.
    pub async fn create_order(&self, title: &str, table: Value, is_vip: bool) -> Order {
        let body = serde_json::json!({
            "song_title": title,
            "table_id": table,
            "isVip": is_vip,
        });
        let (status, order) = self.request(Method::POST, "/orders", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {order}");
        serde_json::from_value(order).expect("order body")
    }

    /// Song titles of the current queue, in position order.
    pub async fn titles(&self) -> Vec<String> {
        let (_, orders) = self.request(Method::GET, "/orders", None).await;
        orders
            .as_array()
            .map(|orders| {
                orders
                    .iter()
                    .filter_map(|o| o["song_title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
