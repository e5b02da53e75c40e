// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic application of a [`Changeset`].

use encore_core::{Changeset, EncoreError};
use tracing::debug;

use super::{history, orders};
use crate::database::{map_tr_err, Database};

/// Apply every write in `changes` inside one transaction.
///
/// Any failing statement rolls the whole changeset back.
pub async fn commit(db: &Database, changes: Changeset) -> Result<(), EncoreError> {
    if changes.is_empty() {
        return Ok(());
    }

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;

            // Archive first so a reset can snapshot rows it is about to clear.
            let mut archived = 0;
            for entry in &changes.archive {
                if history::insert(&tx, entry)? {
                    archived += 1;
                }
            }

            let mut removed = 0;
            if changes.clear_orders {
                removed += orders::clear(&tx)?;
            }
            for id in &changes.deletes {
                removed += orders::delete(&tx, *id)?;
            }
            for order in &changes.upserts {
                orders::upsert(&tx, order)?;
            }

            tx.commit()?;
            debug!(
                upserts = changes.upserts.len(),
                removed,
                archived,
                "changeset committed"
            );
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
