// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile in-process request store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use encore_core::{Changeset, EncoreError, HealthStatus, HistoryEntry, Order, OrderId, QueueStore};

#[derive(Default)]
struct MemoryState {
    orders: BTreeMap<OrderId, Order>,
    history: BTreeMap<OrderId, HistoryEntry>,
    /// Highest id ever committed; survives clears.
    high_water: Option<OrderId>,
}

impl MemoryState {
    fn bump(&mut self, id: OrderId) {
        if self.high_water.is_none_or(|hw| id > hw) {
            self.high_water = Some(id);
        }
    }
}

/// Request store kept entirely in memory.
///
/// A changeset is applied under one write lock, so readers never observe
/// half of it.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn initialize(&self) -> Result<(), EncoreError> {
        Ok(())
    }

    async fn load_orders(&self) -> Result<Vec<Order>, EncoreError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            (a.position, &a.created_at, a.id).cmp(&(b.position, &b.created_at, b.id))
        });
        Ok(orders)
    }

    async fn highest_order_id(&self) -> Result<Option<OrderId>, EncoreError> {
        Ok(self.state.read().await.high_water)
    }

    async fn commit(&self, changes: Changeset) -> Result<(), EncoreError> {
        let mut state = self.state.write().await;

        for entry in changes.archive {
            let id = entry.order.id;
            state.bump(id);
            state.history.entry(id).or_insert(entry);
        }
        if changes.clear_orders {
            state.orders.clear();
        }
        for id in &changes.deletes {
            state.orders.remove(id);
        }
        for order in changes.upserts {
            state.bump(order.id);
            state.orders.insert(order.id, order);
        }
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, EncoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<HistoryEntry> = state.history.values().cloned().collect();
        entries.sort_by(|a, b| {
            (&b.order.created_at, b.order.id).cmp(&(&a.order.created_at, a.order.id))
        });
        Ok(entries)
    }

    async fn health_check(&self) -> Result<HealthStatus, EncoreError> {
        Ok(HealthStatus::Healthy)
    }

    async fn close(&self) -> Result<(), EncoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::{OrderKind, OrderStatus, TableId};

    fn order(id: i64, position: i64) -> Order {
        Order {
            id: OrderId(id),
            song_title: format!("song {id}"),
            artist_name: "unspecified".into(),
            table_id: TableId::new("2"),
            note: String::new(),
            dj_note: String::new(),
            status: OrderStatus::New,
            kind: OrderKind::Regular,
            position,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            archived: false,
        }
    }

    #[tokio::test]
    async fn orders_come_back_in_position_order() {
        let store = MemoryStore::new();
        store
            .commit(Changeset {
                upserts: vec![order(1, 1), order(2, 0)],
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = store.load_orders().await.unwrap().iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn high_water_survives_clear() {
        let store = MemoryStore::new();
        store
            .commit(Changeset {
                upserts: vec![order(40, 0)],
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .commit(Changeset {
                clear_orders: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(store.load_orders().await.unwrap().is_empty());
        assert_eq!(store.highest_order_id().await.unwrap(), Some(OrderId(40)));
    }

    #[tokio::test]
    async fn second_archive_of_same_order_is_ignored() {
        let store = MemoryStore::new();
        let mut o = order(5, 0);
        o.status = OrderStatus::Completed;
        let first = HistoryEntry::snapshot(&o);
        o.dj_note = "changed".into();
        let second = HistoryEntry::snapshot(&o);
        store
            .commit(Changeset {
                archive: vec![first, second],
                ..Default::default()
            })
            .await
            .unwrap();
        let history = store.list_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].order.dj_note, "");
    }
}
