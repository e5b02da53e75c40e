// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order reads and the row-level writes used inside changeset transactions.

use encore_core::{EncoreError, Order, OrderId, TableId};
use rusqlite::params;

use super::parse_column;
use crate::database::{map_tr_err, Database};

const ORDER_COLUMNS: &str = "id, song_title, artist_name, table_id, note, dj_note, status, kind, \
                             position, created_at, archived";

fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: OrderId(row.get(0)?),
        song_title: row.get(1)?,
        artist_name: row.get(2)?,
        table_id: TableId::new(row.get::<_, String>(3)?),
        note: row.get(4)?,
        dj_note: row.get(5)?,
        status: parse_column(row, 6)?,
        kind: parse_column(row, 7)?,
        position: row.get(8)?,
        created_at: row.get(9)?,
        archived: row.get(10)?,
    })
}

/// All orders, sorted by position then creation time.
pub async fn load_orders(db: &Database) -> Result<Vec<Order>, EncoreError> {
    db.connection()
        .call(|conn| -> Result<Vec<Order>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY position ASC, created_at ASC, id ASC"
            ))?;
            let orders = stmt
                .query_map([], row_to_order)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(orders)
        })
        .await
        .map_err(map_tr_err)
}

/// Highest id ever written: live table, archive or watermark.
pub async fn highest_order_id(db: &Database) -> Result<Option<OrderId>, EncoreError> {
    db.connection()
        .call(|conn| -> Result<Option<i64>, rusqlite::Error> {
            conn.query_row(
                "SELECT MAX(id) FROM (
                     SELECT id FROM orders
                     UNION ALL SELECT order_id AS id FROM history
                     UNION ALL SELECT value AS id FROM id_watermark WHERE name = 'order'
                 )",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map(|max| max.map(OrderId))
        .map_err(map_tr_err)
}

/// Insert or fully overwrite an order.
pub(crate) fn upsert(conn: &rusqlite::Connection, order: &Order) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO orders (id, song_title, artist_name, table_id, note, dj_note, status, kind,
                             position, created_at, archived)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
             song_title = excluded.song_title,
             artist_name = excluded.artist_name,
             table_id = excluded.table_id,
             note = excluded.note,
             dj_note = excluded.dj_note,
             status = excluded.status,
             kind = excluded.kind,
             position = excluded.position,
             archived = excluded.archived",
        params![
            order.id.0,
            order.song_title,
            order.artist_name,
            order.table_id.as_str(),
            order.note,
            order.dj_note,
            order.status.as_ref(),
            order.kind.as_ref(),
            order.position,
            order.created_at,
            order.archived,
        ],
    )?;
    conn.execute(
        "INSERT INTO id_watermark (name, value) VALUES ('order', ?1)
         ON CONFLICT(name) DO UPDATE SET value = MAX(value, excluded.value)",
        params![order.id.0],
    )?;
    Ok(())
}

pub(crate) fn delete(conn: &rusqlite::Connection, id: OrderId) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM orders WHERE id = ?1", params![id.0])
}

pub(crate) fn clear(conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM orders", [])
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::{Changeset, OrderKind, OrderStatus};

    use crate::queries::changeset::commit;

    fn order(id: i64, position: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId(id),
            song_title: format!("song {id}"),
            artist_name: "unspecified".into(),
            table_id: TableId::new("7"),
            note: String::new(),
            dj_note: String::new(),
            status,
            kind: OrderKind::Regular,
            position,
            created_at: format!("2026-01-01T00:00:0{id}.000Z"),
            archived: false,
        }
    }

    #[tokio::test]
    async fn load_orders_sorts_by_position() {
        let db = Database::open_in_memory().await.unwrap();
        commit(
            &db,
            Changeset {
                upserts: vec![
                    order(1, 2, OrderStatus::New),
                    order(2, 0, OrderStatus::InProgress),
                    order(3, 1, OrderStatus::New),
                ],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let ids: Vec<i64> = load_orders(&db).await.unwrap().iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn row_mapping_preserves_every_field() {
        let db = Database::open_in_memory().await.unwrap();
        let mut original = order(4, 0, OrderStatus::InProgress);
        original.kind = OrderKind::Vip;
        original.note = "key of C".into();
        original.dj_note = "mic 2".into();
        commit(
            &db,
            Changeset {
                upserts: vec![original.clone()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let loaded = load_orders(&db).await.unwrap();
        assert_eq!(loaded, vec![original]);
    }

    #[tokio::test]
    async fn highest_id_is_none_on_empty_db() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(highest_order_id(&db).await.unwrap(), None);
    }

    #[tokio::test]
    async fn highest_id_survives_clear_of_unarchived_orders() {
        let db = Database::open_in_memory().await.unwrap();
        commit(
            &db,
            Changeset {
                upserts: vec![order(9, 0, OrderStatus::New)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
        commit(
            &db,
            Changeset {
                clear_orders: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(load_orders(&db).await.unwrap().is_empty());
        assert_eq!(highest_order_id(&db).await.unwrap(), Some(OrderId(9)));
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_row() {
        let db = Database::open_in_memory().await.unwrap();
        let mut o = order(1, 0, OrderStatus::New);
        commit(
            &db,
            Changeset {
                upserts: vec![o.clone()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        o.song_title = "renamed".into();
        o.status = OrderStatus::InProgress;
        commit(
            &db,
            Changeset {
                upserts: vec![o.clone()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let loaded = load_orders(&db).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].song_title, "renamed");
        assert_eq!(loaded[0].status, OrderStatus::InProgress);
    }
}
