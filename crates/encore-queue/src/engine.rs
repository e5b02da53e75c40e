// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue ordering and status rules.
//!
//! Every command takes the current orders (sorted by position) and returns
//! an [`Outcome`] whose [`Changeset`] the caller commits atomically. Nothing
//! here performs I/O, so the rules can be tested without a store.
//!
//! After every command the sequence is laid out as the active segment
//! followed by the completed segment, and positions are renumbered `0..n`.

use std::collections::HashMap;

use encore_core::{
    Changeset, EncoreError, HistoryEntry, NotificationKind, Order, OrderId, OrderKind,
    OrderStatus, TableId,
};

/// Guest input for a new order.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub song_title: Option<String>,
    pub artist_name: Option<String>,
    pub table_id: Option<TableId>,
    pub is_vip: bool,
    pub note: Option<String>,
}

/// Guest edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderEdit {
    pub song_title: Option<String>,
    pub artist_name: Option<String>,
    pub note: Option<String>,
}

/// Result of applying one command to the queue.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub changes: Changeset,
    /// The affected order: post-command for updates, pre-command for deletes.
    pub order: Option<Order>,
    /// Notification the command produces, carrying `order` as its payload.
    pub notify: Option<NotificationKind>,
}

impl Outcome {
    /// Whether observers need an `orders_changed` signal.
    pub fn changes_orders(&self) -> bool {
        self.changes.clear_orders
            || !self.changes.deletes.is_empty()
            || !self.changes.upserts.is_empty()
    }
}

/// Parse a status string from the wire. Only the three lifecycle states are accepted.
pub fn parse_status(raw: &str) -> Result<OrderStatus, EncoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EncoreError::Validation("status is required".into()));
    }
    raw.parse().map_err(|_| {
        EncoreError::Validation(format!(
            "unknown status `{raw}` (expected new, in_progress or completed)"
        ))
    })
}

/// Stateless rule set. Holds only the configured artist sentinel.
#[derive(Debug, Clone)]
pub struct QueueEngine {
    unspecified_artist: String,
}

impl QueueEngine {
    pub fn new(unspecified_artist: impl Into<String>) -> Self {
        Self {
            unspecified_artist: unspecified_artist.into(),
        }
    }

    fn artist_or_sentinel(&self, artist: Option<String>) -> String {
        artist
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| self.unspecified_artist.clone())
    }

    /// Build and place a new order.
    ///
    /// VIP orders go directly behind the last in-progress order; regular
    /// orders go to the end of the active segment.
    pub fn create(
        &self,
        orders: &[Order],
        id: OrderId,
        created_at: String,
        request: NewOrder,
    ) -> Result<Outcome, EncoreError> {
        let song_title = request
            .song_title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EncoreError::Validation("song_title is required".into()))?;
        let table_id = request
            .table_id
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EncoreError::Validation("table_id is required".into()))?;

        let order = Order {
            id,
            song_title,
            artist_name: self.artist_or_sentinel(request.artist_name),
            table_id,
            note: request.note.unwrap_or_default(),
            dj_note: String::new(),
            status: OrderStatus::New,
            kind: if request.is_vip {
                OrderKind::Vip
            } else {
                OrderKind::Regular
            },
            position: 0,
            created_at,
            archived: false,
        };

        let (mut active, completed) = partition(orders.to_vec());
        let slot = match order.kind {
            OrderKind::Vip => vip_slot(&active),
            OrderKind::Regular => active.len(),
        };
        active.insert(slot, order);

        let after = renumber(active.into_iter().chain(completed).collect());
        let placed = after.iter().find(|o| o.id == id).cloned();
        Ok(Outcome {
            changes: Changeset {
                upserts: changed(orders, &after),
                ..Default::default()
            },
            order: placed,
            notify: None,
        })
    }

    /// Overwrite the supplied guest fields and emit an `edited` notification.
    pub fn edit(&self, orders: &[Order], id: OrderId, edit: OrderEdit) -> Result<Outcome, EncoreError> {
        let mut order = find(orders, id)?.clone();

        if let Some(title) = edit.song_title {
            let title = title.trim();
            if title.is_empty() {
                return Err(EncoreError::Validation("song_title cannot be empty".into()));
            }
            order.song_title = title.to_string();
        }
        if let Some(artist) = edit.artist_name {
            order.artist_name = self.artist_or_sentinel(Some(artist));
        }
        if let Some(note) = edit.note {
            order.note = note;
        }

        Ok(Outcome {
            changes: Changeset {
                upserts: vec![order.clone()],
                ..Default::default()
            },
            order: Some(order),
            notify: Some(NotificationKind::Edited),
        })
    }

    /// Move an order to `status`.
    ///
    /// Completing an order snapshots it into history the first time only.
    /// Setting the status an order already has writes nothing.
    pub fn set_status(
        &self,
        orders: &[Order],
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Outcome, EncoreError> {
        let current = find(orders, id)?;
        if current.status == status {
            return Ok(Outcome {
                order: Some(current.clone()),
                ..Default::default()
            });
        }

        let mut archive = Vec::new();
        let sequence: Vec<Order> = orders
            .iter()
            .map(|o| {
                if o.id != id {
                    return o.clone();
                }
                let mut updated = Order {
                    status,
                    ..o.clone()
                };
                if status == OrderStatus::Completed && !updated.archived {
                    archive.push(HistoryEntry::snapshot(&updated));
                    updated.archived = true;
                }
                updated
            })
            .collect();

        let (active, completed) = partition(sequence);
        let after = renumber(active.into_iter().chain(completed).collect());
        let updated = after.iter().find(|o| o.id == id).cloned();
        Ok(Outcome {
            changes: Changeset {
                upserts: changed(orders, &after),
                archive,
                ..Default::default()
            },
            order: updated,
            notify: None,
        })
    }

    /// Replace the DJ annotation. No notification; guests never see it.
    pub fn set_dj_note(
        &self,
        orders: &[Order],
        id: OrderId,
        dj_note: Option<String>,
    ) -> Result<Outcome, EncoreError> {
        let order = Order {
            dj_note: dj_note.unwrap_or_default(),
            ..find(orders, id)?.clone()
        };
        Ok(Outcome {
            changes: Changeset {
                upserts: vec![order.clone()],
                ..Default::default()
            },
            order: Some(order),
            notify: None,
        })
    }

    /// Hard-delete an order. A guest cancellation carries the pre-delete
    /// snapshot in a `cancelled` notification.
    pub fn delete(&self, orders: &[Order], id: OrderId, by_guest: bool) -> Result<Outcome, EncoreError> {
        let removed = find(orders, id)?.clone();
        let remaining: Vec<Order> = orders.iter().filter(|o| o.id != id).cloned().collect();
        let after = renumber(remaining);
        Ok(Outcome {
            changes: Changeset {
                deletes: vec![id],
                upserts: changed(orders, &after),
                ..Default::default()
            },
            order: Some(removed),
            notify: by_guest.then_some(NotificationKind::Cancelled),
        })
    }

    /// Remove every order, active or completed, whose table matches `table`.
    pub fn clear_table(&self, orders: &[Order], table: &str) -> Result<Outcome, EncoreError> {
        if table.trim().is_empty() {
            return Err(EncoreError::Validation("table_id is required".into()));
        }
        let (removed, remaining): (Vec<Order>, Vec<Order>) = orders
            .iter()
            .cloned()
            .partition(|o| o.table_id.matches(table));
        if removed.is_empty() {
            return Ok(Outcome::default());
        }
        let after = renumber(remaining);
        Ok(Outcome {
            changes: Changeset {
                deletes: removed.iter().map(|o| o.id).collect(),
                upserts: changed(orders, &after),
                ..Default::default()
            },
            order: None,
            notify: None,
        })
    }

    /// Lay the active segment out in exactly `ordered_ids` order.
    ///
    /// `ordered_ids` must name every active order once and nothing else;
    /// otherwise the command fails and produces no changes.
    pub fn reorder(&self, orders: &[Order], ordered_ids: &[OrderId]) -> Result<Outcome, EncoreError> {
        let (active, completed) = partition(orders.to_vec());
        let mismatch = || EncoreError::ReorderMismatch {
            expected: active.len(),
            received: ordered_ids.len(),
        };
        if ordered_ids.len() != active.len() {
            return Err(mismatch());
        }

        let mut by_id: HashMap<OrderId, Order> = active.iter().map(|o| (o.id, o.clone())).collect();
        let mut reordered = Vec::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            // A duplicate fails here too: its first occurrence already took the entry.
            reordered.push(by_id.remove(id).ok_or_else(mismatch)?);
        }

        let after = renumber(reordered.into_iter().chain(completed).collect());
        Ok(Outcome {
            changes: Changeset {
                upserts: changed(orders, &after),
                ..Default::default()
            },
            order: None,
            notify: None,
        })
    }

    /// Archive every completed order not yet archived, then drop all orders.
    pub fn reset_all(&self, orders: &[Order]) -> Outcome {
        let archive = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed && !o.archived)
            .map(HistoryEntry::snapshot)
            .collect();
        Outcome {
            changes: Changeset {
                clear_orders: true,
                archive,
                ..Default::default()
            },
            order: None,
            notify: None,
        }
    }
}

fn find(orders: &[Order], id: OrderId) -> Result<&Order, EncoreError> {
    orders
        .iter()
        .find(|o| o.id == id)
        .ok_or(EncoreError::NotFound { id })
}

/// Split into (active, completed), each keeping its current relative order.
fn partition(orders: Vec<Order>) -> (Vec<Order>, Vec<Order>) {
    orders.into_iter().partition(Order::is_active)
}

/// Index right behind the last in-progress order, or the front when none is in progress.
fn vip_slot(active: &[Order]) -> usize {
    active
        .iter()
        .rposition(|o| o.status == OrderStatus::InProgress)
        .map_or(0, |i| i + 1)
}

fn renumber(mut sequence: Vec<Order>) -> Vec<Order> {
    for (position, order) in sequence.iter_mut().enumerate() {
        order.position = position as i64;
    }
    sequence
}

/// Orders in `after` that are new or differ from their `before` version.
fn changed(before: &[Order], after: &[Order]) -> Vec<Order> {
    let previous: HashMap<OrderId, &Order> = before.iter().map(|o| (o.id, o)).collect();
    after
        .iter()
        .filter(|o| previous.get(&o.id).is_none_or(|p| *p != *o))
        .cloned()
        .collect()
}

/// Apply a committed changeset to an in-memory snapshot. Used by tests to
/// chain commands without a store.
#[cfg(test)]
pub(crate) fn apply(orders: &[Order], changes: &Changeset) -> Vec<Order> {
    use std::collections::HashSet;

    let mut map: HashMap<OrderId, Order> = if changes.clear_orders {
        HashMap::new()
    } else {
        orders.iter().map(|o| (o.id, o.clone())).collect()
    };
    let deleted: HashSet<OrderId> = changes.deletes.iter().copied().collect();
    map.retain(|id, _| !deleted.contains(id));
    for order in &changes.upserts {
        map.insert(order.id, order.clone());
    }
    let mut out: Vec<Order> = map.into_values().collect();
    out.sort_by(|a, b| a.position.cmp(&b.position).then(a.created_at.cmp(&b.created_at)));
    out
}
