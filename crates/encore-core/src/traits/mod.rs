// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the queue engine and its collaborators.

pub mod storage;

pub use storage::QueueStore;
