// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the queue REST API.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use encore_core::{EncoreError, HealthStatus, HistoryEntry, Notification, Order, OrderId, TableId};
use encore_queue::{NewOrder, OrderEdit};

use crate::server::GatewayState;

/// Request body for POST /orders.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub song_title: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub table_id: Option<TableId>,
    #[serde(rename = "isVip", default)]
    pub is_vip: bool,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(body: CreateOrderRequest) -> Self {
        NewOrder {
            song_title: body.song_title,
            artist_name: body.artist_name,
            table_id: body.table_id,
            is_vip: body.is_vip,
            note: body.note,
        }
    }
}

/// Request body for PATCH /orders/{id}.
#[derive(Debug, Default, Deserialize)]
pub struct EditOrderRequest {
    #[serde(default)]
    pub song_title: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<EditOrderRequest> for OrderEdit {
    fn from(body: EditOrderRequest) -> Self {
        OrderEdit {
            song_title: body.song_title,
            artist_name: body.artist_name,
            note: body.note,
        }
    }
}

/// Request body for PATCH /orders/{id}/status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for PATCH /orders/{id}/dj-note.
#[derive(Debug, Default, Deserialize)]
pub struct DjNoteRequest {
    #[serde(default)]
    pub dj_note: Option<String>,
}

/// Request body for POST /orders/reorder.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(rename = "orderedIds")]
    pub ordered_ids: Vec<OrderId>,
}

/// Query string for DELETE /orders/{id}.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "byGuest", default)]
    pub by_guest: Option<String>,
}

impl DeleteQuery {
    fn by_guest(&self) -> bool {
        self.by_guest
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(rename = "dbConnected")]
    pub db_connected: bool,
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps [`EncoreError`] onto an HTTP status and a JSON error body.
///
/// Server-side failures are logged and reported without detail.
#[derive(Debug)]
pub struct ApiError(pub EncoreError);

impl From<EncoreError> for ApiError {
    fn from(err: EncoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EncoreError::Validation(_) | EncoreError::ReorderMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            EncoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            EncoreError::Storage { .. } | EncoreError::Config(_) | EncoreError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let error = if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self.0, "request rejected");
            self.0.to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ApiResult<OrderId> {
    raw.parse()
        .map_err(|_| ApiError(EncoreError::Validation(format!("`{raw}` is not a valid order id"))))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError(EncoreError::Validation(rejection.body_text())))
}

/// GET /orders
pub async fn list_orders(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.queue.list_orders().await?))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.queue.get_order(parse_id(&id)?).await?))
}

/// POST /orders
pub async fn create_order(
    State(state): State<GatewayState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.queue.create(json_body(body)?.into()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /orders/{id}
pub async fn edit_order(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Json<EditOrderRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let id = parse_id(&id)?;
    let edit = json_body(body)?;
    Ok(Json(state.queue.edit(id, edit.into()).await?))
}

/// PATCH /orders/{id}/status
pub async fn set_status(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let id = parse_id(&id)?;
    let status = json_body(body)?.status.unwrap_or_default();
    Ok(Json(state.queue.set_status(id, &status).await?))
}

/// PATCH /orders/{id}/dj-note
pub async fn set_dj_note(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Json<DjNoteRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let id = parse_id(&id)?;
    let dj_note = json_body(body)?.dj_note;
    Ok(Json(state.queue.set_dj_note(id, dj_note).await?))
}

/// DELETE /orders/{id}?byGuest=true
pub async fn delete_order(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    state.queue.delete(parse_id(&id)?, query.by_guest()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /orders/table/{table_id}
pub async fn clear_table(
    State(state): State<GatewayState>,
    Path(table_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.queue.clear_table(&table_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders/reorder
pub async fn reorder_orders(
    State(state): State<GatewayState>,
    body: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Order>>> {
    let body = json_body(body)?;
    Ok(Json(state.queue.reorder(&body.ordered_ids).await?))
}

/// DELETE /orders/all
pub async fn reset_all(State(state): State<GatewayState>) -> ApiResult<StatusCode> {
    state.queue.reset_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /notifications
pub async fn list_notifications(State(state): State<GatewayState>) -> Json<Vec<Notification>> {
    Json(state.queue.notifications().await)
}

/// DELETE /notifications
pub async fn clear_notifications(State(state): State<GatewayState>) -> StatusCode {
    state.queue.clear_notifications().await;
    StatusCode::NO_CONTENT
}

/// GET /history
pub async fn list_history(State(state): State<GatewayState>) -> ApiResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.queue.history().await?))
}

/// GET /health
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let report = state.queue.health().await;
    Json(HealthResponse {
        db_connected: report.db_connected,
        status: if report.status == HealthStatus::Healthy {
            "ok"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_numeric_table_and_camel_case_vip() {
        let json = r#"{"song_title": "Kalinka", "table_id": 5, "isVip": true}"#;
        let req: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.table_id.unwrap().as_str(), "5");
        assert!(req.is_vip);
        assert!(req.artist_name.is_none());
    }

    #[test]
    fn create_request_defaults_missing_fields() {
        let req: CreateOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.song_title.is_none());
        assert!(req.table_id.is_none());
        assert!(!req.is_vip);
    }

    #[test]
    fn reorder_request_accepts_mixed_id_forms() {
        let json = r#"{"orderedIds": [3, "1", "2"]}"#;
        let req: ReorderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ordered_ids, vec![OrderId(3), OrderId(1), OrderId(2)]);
    }

    #[test]
    fn delete_query_flag() {
        let yes = DeleteQuery {
            by_guest: Some("true".into()),
        };
        let one = DeleteQuery {
            by_guest: Some("1".into()),
        };
        let no = DeleteQuery {
            by_guest: Some("false".into()),
        };
        assert!(yes.by_guest());
        assert!(one.by_guest());
        assert!(!no.by_guest());
        assert!(!DeleteQuery::default().by_guest());
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("42").unwrap(), OrderId(42));
        let err = parse_id("abc").unwrap_err();
        assert!(matches!(err.0, EncoreError::Validation(_)));
    }

    #[test]
    fn error_statuses() {
        let cases = [
            (EncoreError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                EncoreError::ReorderMismatch {
                    expected: 2,
                    received: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (EncoreError::NotFound { id: OrderId(1) }, StatusCode::NOT_FOUND),
            (
                EncoreError::Storage {
                    source: "disk I/O error".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }

    #[test]
    fn health_response_uses_wire_names() {
        let resp = HealthResponse {
            db_connected: true,
            status: "ok",
            version: "0.1.0".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["dbConnected"], true);
        assert_eq!(json["status"], "ok");
    }
}
