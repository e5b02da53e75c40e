// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History archive reads and appends.

use encore_core::{EncoreError, HistoryEntry, Order, OrderId, TableId};
use rusqlite::params;

use super::parse_column;
use crate::database::{map_tr_err, Database};

/// Append a snapshot. Returns false if the order was already archived.
pub(crate) fn insert(conn: &rusqlite::Connection, entry: &HistoryEntry) -> rusqlite::Result<bool> {
    let o = &entry.order;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO history (order_id, song_title, artist_name, table_id, note, dj_note,
                                        status, kind, position, created_at, archived_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            o.id.0,
            o.song_title,
            o.artist_name,
            o.table_id.as_str(),
            o.note,
            o.dj_note,
            o.status.as_ref(),
            o.kind.as_ref(),
            o.position,
            o.created_at,
            entry.archived_at,
        ],
    )?;
    Ok(inserted > 0)
}

/// Archived snapshots, newest first by creation time.
pub async fn list_history(db: &Database) -> Result<Vec<HistoryEntry>, EncoreError> {
    db.connection()
        .call(|conn| -> Result<Vec<HistoryEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT order_id, song_title, artist_name, table_id, note, dj_note, status, kind,
                        position, created_at, archived_at
                 FROM history ORDER BY created_at DESC, order_id DESC",
            )?;
            let entries = stmt
                .query_map([], |row| {
                    Ok(HistoryEntry {
                        order: Order {
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
                            archived: true,
                        },
                        archived_at: row.get(10)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}
