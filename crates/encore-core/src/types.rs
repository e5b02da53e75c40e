// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the queue engine, storage backends, and gateway.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

/// Format used for every persisted and wire timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Unique, never-reused identifier of an order.
///
/// Clients written against the original HTTP API send ids either as JSON
/// numbers or as numeric strings, so deserialization accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(OrderId)
    }
}

impl Serialize for OrderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderIdVisitor;

        impl Visitor<'_> for OrderIdVisitor {
            type Value = OrderId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer order id or a numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<OrderId, E> {
                Ok(OrderId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<OrderId, E> {
                i64::try_from(v)
                    .map(OrderId)
                    .map_err(|_| E::custom(format!("order id {v} is out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<OrderId, E> {
                v.parse()
                    .map_err(|_| E::custom(format!("`{v}` is not a valid order id")))
            }
        }

        deserializer.deserialize_any(OrderIdVisitor)
    }
}

/// Guest table identifier.
///
/// Tables arrive as numbers from some clients and strings from others. The
/// raw value is kept for display; [`TableId::key`] gives the normalized form
/// used for matching, so `5`, `"5"` and `" 05 "` all refer to the same table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId(String);

impl TableId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalized matching key.
    pub fn key(&self) -> String {
        normalize_table_key(&self.0)
    }

    /// Returns true if `other` names the same table under loose matching.
    pub fn matches(&self, other: &str) -> bool {
        self.key() == normalize_table_key(other)
    }
}

fn normalize_table_key(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_lowercase(),
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TableId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TableId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableIdVisitor;

        impl Visitor<'_> for TableIdVisitor {
            type Value = TableId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table number or name")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TableId, E> {
                Ok(TableId::new(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TableId, E> {
                Ok(TableId::new(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<TableId, E> {
                if v.fract() == 0.0 {
                    Ok(TableId::new(format!("{}", v as i64)))
                } else {
                    Ok(TableId::new(v.to_string()))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TableId, E> {
                Ok(TableId::new(v))
            }
        }

        deserializer.deserialize_any(TableIdVisitor)
    }
}

/// Lifecycle state of an order. Moves forward: new -> in_progress -> completed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Completed,
}

impl OrderStatus {
    /// Active orders participate in queue ordering.
    pub fn is_active(self) -> bool {
        self != Self::Completed
    }
}

/// Priority class fixed when the order is created.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderKind {
    Regular,
    Vip,
}

/// A song request submitted by a guest table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub song_title: String,
    pub artist_name: String,
    pub table_id: TableId,
    /// Guest-supplied free text.
    pub note: String,
    /// DJ-only annotation.
    pub dj_note: String,
    pub status: OrderStatus,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    /// Position in the queue. Active orders always precede completed ones.
    #[serde(rename = "order_index")]
    pub position: i64,
    pub created_at: String,
    /// Set once a snapshot of this order has been written to history.
    #[serde(skip)]
    pub archived: bool,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Guest action surfaced to the DJ.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    Edited,
    Cancelled,
}

/// Entry in the bounded notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Full order snapshot at event time.
    pub payload: Order,
    pub timestamp: String,
}

/// Snapshot of an order taken when it was completed (or swept up by a reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub order: Order,
    pub archived_at: String,
}

impl HistoryEntry {
    pub fn snapshot(order: &Order) -> Self {
        Self {
            order: Order {
                archived: true,
                ..order.clone()
            },
            archived_at: timestamp_now(),
        }
    }
}

/// Signal fanned out to every connected observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// The queue changed; observers re-fetch it.
    OrdersChanged,
    NotificationCreated { notification: Notification },
    NotificationsCleared,
}

impl QueueEvent {
    /// Wire name of the event, also used as the SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrdersChanged => "orders_changed",
            Self::NotificationCreated { .. } => "notification_created",
            Self::NotificationsCleared => "notifications_cleared",
        }
    }
}

/// The set of writes produced by one queue command.
///
/// Backends apply a changeset all-or-nothing, in this order: history appends,
/// clear, deletes, upserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    /// Remove every order before applying the rest.
    pub clear_orders: bool,
    pub deletes: Vec<OrderId>,
    /// Orders to insert or overwrite in full.
    pub upserts: Vec<Order>,
    /// History snapshots to append. A second snapshot of the same order is ignored.
    pub archive: Vec<HistoryEntry>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        !self.clear_orders
            && self.deletes.is_empty()
            && self.upserts.is_empty()
            && self.archive.is_empty()
    }
}

/// Health reported by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}
