// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use futures::StreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use encore_config::model::{QueueConfig, ServerConfig};
use encore_core::QueueStore;
use encore_gateway::{GatewayState, router};
use encore_queue::QueueService;
use encore_storage::MemoryStore;

struct TestApp {
    app: Router,
    queue: Arc<QueueService>,
    shutdown: CancellationToken,
}

async fn app() -> TestApp {
    let store: Arc<dyn QueueStore> = Arc::new(MemoryStore::new());
    let queue = Arc::new(
        QueueService::new(store, &QueueConfig::default())
            .await
            .unwrap(),
    );
    let shutdown = CancellationToken::new();
    let state = GatewayState::new(Arc::clone(&queue), shutdown.clone());
    TestApp {
        app: router(state, &ServerConfig::default()),
        queue,
        shutdown,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, title: &str, table: Value, vip: bool) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/orders",
        Some(json!({"song_title": title, "table_id": table, "isVip": vip})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn titles(orders: &Value) -> Vec<&str> {
    orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["song_title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn create_returns_the_placed_order() {
    let t = app().await;
    let order = create(&t.app, "Kalinka", json!(5), true).await;
    assert_eq!(order["song_title"], "Kalinka");
    assert_eq!(order["artist_name"], "unspecified");
    assert_eq!(order["table_id"], "5");
    assert_eq!(order["type"], "vip");
    assert_eq!(order["status"], "new");
    assert_eq!(order["order_index"], 0);
    assert!(order["id"].is_i64());
}

#[tokio::test]
async fn create_without_required_fields_is_400() {
    let t = app().await;
    let (status, body) = send(&t.app, Method::POST, "/orders", Some(json!({"table_id": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("song_title"));

    let (status, _) = send(&t.app, Method::POST, "/orders", Some(json!({"song_title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400_with_error_body() {
    let t = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vip_after_in_progress_scenario() {
    let t = app().await;
    let a = create(&t.app, "A", json!(5), false).await;
    let uri = format!("/orders/{}/status", a["id"]);
    let (status, body) = send(&t.app, Method::PATCH, &uri, Some(json!({"status": "in_progress"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");

    create(&t.app, "B", json!("2"), true).await;
    let (_, orders) = send(&t.app, Method::GET, "/orders", None).await;
    assert_eq!(titles(&orders), vec!["A", "B"]);
}

#[tokio::test]
async fn unknown_and_invalid_ids() {
    let t = app().await;
    let (status, body) = send(&t.app, Method::GET, "/orders/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "order 12345 not found");

    let (status, _) = send(&t.app, Method::PATCH, "/orders/12345", Some(json!({"note": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, Method::DELETE, "/orders/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_status_is_400() {
    let t = app().await;
    let a = create(&t.app, "A", json!(1), false).await;
    let uri = format!("/orders/{}/status", a["id"]);
    let (status, _) = send(&t.app, Method::PATCH, &uri, Some(json!({"status": "done"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&t.app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_and_dj_note() {
    let t = app().await;
    let a = create(&t.app, "A", json!(1), false).await;
    let id = &a["id"];

    let (status, body) = send(
        &t.app,
        Method::PATCH,
        &format!("/orders/{id}/dj-note"),
        Some(json!({"dj_note": "mic 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dj_note"], "mic 2");

    let (status, body) = send(
        &t.app,
        Method::PATCH,
        &format!("/orders/{id}"),
        Some(json!({"artist_name": "Band"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist_name"], "Band");
    assert_eq!(body["song_title"], "A");
    assert_eq!(body["dj_note"], "mic 2");

    let (_, notifications) = send(&t.app, Method::GET, "/notifications", None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "edited");
    assert_eq!(notifications[0]["payload"]["artist_name"], "Band");
}

#[tokio::test]
async fn guest_delete_and_notification_clear() {
    let t = app().await;
    let a = create(&t.app, "A", json!(1), false).await;
    let b = create(&t.app, "B", json!(1), false).await;

    let (status, body) = send(&t.app, Method::DELETE, &format!("/orders/{}?byGuest=true", a["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    let (status, _) = send(&t.app, Method::DELETE, &format!("/orders/{}", b["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, notifications) = send(&t.app, Method::GET, "/notifications", None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "cancelled");
    assert_eq!(notifications[0]["payload"]["id"], a["id"]);

    let (status, _) = send(&t.app, Method::DELETE, "/notifications", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, notifications) = send(&t.app, Method::GET, "/notifications", None).await;
    assert_eq!(notifications, json!([]));
}

#[tokio::test]
async fn clear_table_matches_numbers_and_strings() {
    let t = app().await;
    create(&t.app, "A", json!(5), false).await;
    create(&t.app, "B", json!("5"), false).await;
    create(&t.app, "C", json!(6), false).await;

    let (status, _) = send(&t.app, Method::DELETE, "/orders/table/5", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, orders) = send(&t.app, Method::GET, "/orders", None).await;
    assert_eq!(titles(&orders), vec!["C"]);
}

#[tokio::test]
async fn reorder_success_and_mismatch() {
    let t = app().await;
    let a = create(&t.app, "A", json!(1), false).await;
    let b = create(&t.app, "B", json!(1), false).await;
    let c = create(&t.app, "C", json!(1), false).await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/orders/reorder",
        Some(json!({"orderedIds": [a["id"], c["id"]]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("reorder"));
    let (_, orders) = send(&t.app, Method::GET, "/orders", None).await;
    assert_eq!(titles(&orders), vec!["A", "B", "C"]);

    let ids_as_strings: Vec<String> = [&c, &a, &b].iter().map(|o| o["id"].to_string()).collect();
    let (status, orders) = send(
        &t.app,
        Method::POST,
        "/orders/reorder",
        Some(json!({"orderedIds": ids_as_strings})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&orders), vec!["C", "A", "B"]);
}

#[tokio::test]
async fn completion_history_and_reset() {
    let t = app().await;
    let a = create(&t.app, "A", json!(1), false).await;
    create(&t.app, "B", json!(2), false).await;
    let uri = format!("/orders/{}/status", a["id"]);
    for _ in 0..2 {
        let (status, _) = send(&t.app, Method::PATCH, &uri, Some(json!({"status": "completed"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, history) = send(&t.app, Method::GET, "/history", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["song_title"], "A");
    assert!(history[0]["archived_at"].is_string());

    let (status, _) = send(&t.app, Method::DELETE, "/orders/all", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, orders) = send(&t.app, Method::GET, "/orders", None).await;
    assert_eq!(orders, json!([]));
    let (_, history) = send(&t.app, Method::GET, "/history", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_reports_db_connected() {
    let t = app().await;
    let (status, body) = send(&t.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dbConnected"], true);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn cors_headers_when_permissive() {
    let t = app().await;
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://dj.local")
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}

#[tokio::test]
async fn sse_stream_carries_queue_events_and_ends_on_shutdown() {
    let t = app().await;
    let request = Request::builder().uri("/events").body(Body::empty()).unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let mut body = response.into_body().into_data_stream();
    assert_eq!(t.queue.broadcaster().observer_count(), 1);
    create(&t.app, "A", json!(1), false).await;

    let frame = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let frame = String::from_utf8(frame.to_vec()).unwrap();
    assert!(frame.contains("event: orders_changed"));
    assert!(frame.contains(r#"{"type":"orders_changed"}"#));

    t.shutdown.cancel();
    let end = tokio::time::timeout(Duration::from_secs(5), async {
        while body.next().await.is_some() {}
    })
    .await;
    assert!(end.is_ok());
}
