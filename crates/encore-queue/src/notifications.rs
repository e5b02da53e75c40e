// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded notification log.

use std::collections::VecDeque;

use encore_core::Notification;

/// Newest-first log of guest-visible events. Holds at most `capacity`
/// entries; appending to a full log evicts the oldest.
#[derive(Debug)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, notification: Notification) {
        self.entries.push_front(notification);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn list(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::{NotificationKind, Order, OrderId, OrderKind, OrderStatus, TableId};

    fn notification(id: i64) -> Notification {
        Notification {
            id,
            kind: NotificationKind::Edited,
            payload: Order {
                id: OrderId(id),
                song_title: "Song".into(),
                artist_name: "unspecified".into(),
                table_id: TableId::new("1"),
                note: String::new(),
                dj_note: String::new(),
                status: OrderStatus::New,
                kind: OrderKind::Regular,
                position: 0,
                created_at: "2026-01-01T00:00:00.000Z".into(),
                archived: false,
            },
            timestamp: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn newest_first() {
        let mut log = NotificationLog::new(5);
        log.append(notification(1));
        log.append(notification(2));
        let ids: Vec<i64> = log.list().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn never_exceeds_capacity_and_drops_oldest() {
        let mut log = NotificationLog::new(50);
        for id in 0..120 {
            log.append(notification(id));
            assert!(log.len() <= 50);
        }
        let list = log.list();
        assert_eq!(list.len(), 50);
        assert_eq!(list.first().unwrap().id, 119);
        assert_eq!(list.last().unwrap().id, 70);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = NotificationLog::new(3);
        log.append(notification(1));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = NotificationLog::new(0);
        log.append(notification(1));
        log.append(notification(2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.list()[0].id, 2);
    }
}
