// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized command dispatch over a [`QueueStore`].
//!
//! Every mutating command runs under one async mutex: load the current
//! orders, let the [`QueueEngine`] compute a changeset, commit it, record any
//! notification, then publish events. Observers therefore see events in the
//! order commands were accepted, and a failed commit leaves both the store
//! and the notification log untouched.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info};

use encore_config::model::QueueConfig;
use encore_core::{
    EncoreError, HealthStatus, HistoryEntry, Notification, Order, OrderId, QueueEvent, QueueStore,
    timestamp_now,
};

use crate::broadcast::Broadcaster;
use crate::engine::{self, NewOrder, OrderEdit, Outcome, QueueEngine};
use crate::ids::IdGenerator;
use crate::notifications::NotificationLog;

/// State only touched while the command lock is held.
struct CommandState {
    order_ids: IdGenerator,
    notification_ids: IdGenerator,
    notifications: NotificationLog,
}

/// Result of a health probe against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub db_connected: bool,
    pub status: HealthStatus,
}

/// The request queue: one instance per venue.
pub struct QueueService {
    store: Arc<dyn QueueStore>,
    engine: QueueEngine,
    broadcaster: Broadcaster,
    state: Mutex<CommandState>,
}

impl QueueService {
    /// Build a service over an initialized store.
    ///
    /// Order ids continue after the highest id the store has ever held.
    pub async fn new(store: Arc<dyn QueueStore>, config: &QueueConfig) -> Result<Self, EncoreError> {
        let floor = store.highest_order_id().await?.map_or(0, |id| id.0);
        debug!(floor, "order id generator seeded");
        Ok(Self {
            store,
            engine: QueueEngine::new(config.unspecified_artist.clone()),
            broadcaster: Broadcaster::new(config.broadcast_capacity),
            state: Mutex::new(CommandState {
                order_ids: IdGenerator::starting_after(floor),
                notification_ids: IdGenerator::starting_after(0),
                notifications: NotificationLog::new(config.notification_capacity),
            }),
        })
    }

    pub fn store(&self) -> &Arc<dyn QueueStore> {
        &self.store
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.broadcaster.subscribe()
    }

    /// Active orders followed by completed ones, in position order.
    pub async fn list_orders(&self) -> Result<Vec<Order>, EncoreError> {
        self.store.load_orders().await
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order, EncoreError> {
        self.store
            .load_orders()
            .await?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or(EncoreError::NotFound { id })
    }

    pub async fn create(&self, request: NewOrder) -> Result<Order, EncoreError> {
        let mut state = self.state.lock().await;
        let id = OrderId(state.order_ids.next_id());
        let outcome = self
            .execute(&mut state, "create", |engine, orders| {
                engine.create(orders, id, timestamp_now(), request)
            })
            .await?;
        let order = placed(outcome)?;
        info!(
            order_id = %order.id,
            table_id = %order.table_id,
            kind = %order.kind,
            position = order.position,
            "order created"
        );
        Ok(order)
    }

    pub async fn edit(&self, id: OrderId, edit: OrderEdit) -> Result<Order, EncoreError> {
        let mut state = self.state.lock().await;
        let outcome = self
            .execute(&mut state, "edit", |engine, orders| engine.edit(orders, id, edit))
            .await?;
        info!(order_id = %id, "order edited");
        placed(outcome)
    }

    /// Move an order to `status` (`new`, `in_progress` or `completed`).
    pub async fn set_status(&self, id: OrderId, status: &str) -> Result<Order, EncoreError> {
        let status = engine::parse_status(status)?;
        let mut state = self.state.lock().await;
        let outcome = self
            .execute(&mut state, "set_status", |engine, orders| {
                engine.set_status(orders, id, status)
            })
            .await?;
        info!(
            order_id = %id,
            %status,
            archived = outcome.changes.archive.len(),
            "order status set"
        );
        placed(outcome)
    }

    pub async fn set_dj_note(&self, id: OrderId, dj_note: Option<String>) -> Result<Order, EncoreError> {
        let mut state = self.state.lock().await;
        let outcome = self
            .execute(&mut state, "set_dj_note", |engine, orders| {
                engine.set_dj_note(orders, id, dj_note)
            })
            .await?;
        info!(order_id = %id, "dj note set");
        placed(outcome)
    }

    pub async fn delete(&self, id: OrderId, by_guest: bool) -> Result<(), EncoreError> {
        let mut state = self.state.lock().await;
        self.execute(&mut state, "delete", |engine, orders| {
            engine.delete(orders, id, by_guest)
        })
        .await?;
        info!(order_id = %id, by_guest, "order deleted");
        Ok(())
    }

    /// Remove every order for a table. Returns how many were removed.
    pub async fn clear_table(&self, table: &str) -> Result<usize, EncoreError> {
        let mut state = self.state.lock().await;
        let outcome = self
            .execute(&mut state, "clear_table", |engine, orders| {
                engine.clear_table(orders, table)
            })
            .await?;
        let removed = outcome.changes.deletes.len();
        info!(table_id = table, removed, "table cleared");
        Ok(removed)
    }

    /// Apply a DJ-supplied ordering of the active orders and return the new queue.
    pub async fn reorder(&self, ordered_ids: &[OrderId]) -> Result<Vec<Order>, EncoreError> {
        let mut state = self.state.lock().await;
        self.execute(&mut state, "reorder", |engine, orders| {
            engine.reorder(orders, ordered_ids)
        })
        .await?;
        info!(count = ordered_ids.len(), "queue reordered");
        self.store.load_orders().await
    }

    /// Archive outstanding completed orders, drop every order, and clear notifications.
    pub async fn reset_all(&self) -> Result<(), EncoreError> {
        let mut state = self.state.lock().await;
        let outcome = self
            .execute(&mut state, "reset_all", |engine, orders| Ok(engine.reset_all(orders)))
            .await?;
        state.notifications.clear();
        self.broadcaster.publish(QueueEvent::NotificationsCleared);
        info!(archived = outcome.changes.archive.len(), "queue reset");
        Ok(())
    }

    /// Notifications, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.list()
    }

    pub async fn clear_notifications(&self) {
        let mut state = self.state.lock().await;
        let cleared = state.notifications.len();
        state.notifications.clear();
        self.broadcaster.publish(QueueEvent::NotificationsCleared);
        info!(cleared, "notifications cleared");
    }

    /// Archived snapshots, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, EncoreError> {
        self.store.list_history().await
    }

    pub async fn health(&self) -> HealthReport {
        match self.store.health_check().await {
            Ok(status) => HealthReport {
                db_connected: !matches!(status, HealthStatus::Unhealthy(_)),
                status,
            },
            Err(e) => {
                error!(error = %e, "health check failed");
                HealthReport {
                    db_connected: false,
                    status: HealthStatus::Unhealthy(e.to_string()),
                }
            }
        }
    }

    /// Run one command against a fresh snapshot and publish its effects.
    ///
    /// Must be called with the command lock held.
    async fn execute<F>(
        &self,
        state: &mut CommandState,
        command: &'static str,
        plan: F,
    ) -> Result<Outcome, EncoreError>
    where
        F: FnOnce(&QueueEngine, &[Order]) -> Result<Outcome, EncoreError>,
    {
        let orders = self.store.load_orders().await?;
        let outcome = plan(&self.engine, &orders)?;

        if !outcome.changes.is_empty() {
            self.store
                .commit(outcome.changes.clone())
                .await
                .inspect_err(|e| error!(command, error = %e, "commit failed"))?;
        }

        if outcome.changes_orders() {
            self.broadcaster.publish(QueueEvent::OrdersChanged);
        }

        if let (Some(kind), Some(order)) = (outcome.notify, &outcome.order) {
            let notification = Notification {
                id: state.notification_ids.next_id(),
                kind,
                payload: order.clone(),
                timestamp: timestamp_now(),
            };
            debug!(notification_id = notification.id, %kind, order_id = %order.id, "notification recorded");
            state.notifications.append(notification.clone());
            self.broadcaster
                .publish(QueueEvent::NotificationCreated { notification });
        }

        Ok(outcome)
    }
}

fn placed(outcome: Outcome) -> Result<Order, EncoreError> {
    outcome
        .order
        .ok_or_else(|| EncoreError::Internal("command produced no order".into()))
}
