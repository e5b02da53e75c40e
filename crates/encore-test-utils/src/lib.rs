// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Encore integration tests.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder};
