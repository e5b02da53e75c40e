// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-derived, strictly increasing identifiers.

/// Hands out epoch-millisecond ids, bumping past the previous id when two
/// are requested in the same millisecond or the clock steps backwards.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Start after `floor`, typically the highest id already stored.
    pub fn starting_after(floor: i64) -> Self {
        Self { last: floor }
    }

    pub fn next_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }
}
