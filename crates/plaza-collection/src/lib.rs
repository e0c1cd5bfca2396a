// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor page store for the Plaza client sync layer.
//!
//! Maintains one filtered, deduplicated, ordered accumulation of pages and
//! serializes page fetching against it. Out-of-band changes (optimistic
//! mutations, poll merges) land through [`PageStore::upsert`],
//! [`PageStore::remove`], and [`PageStore::merge_snapshot`].

pub mod store;

pub use store::{LoadOutcome, PageStore, RemovedEntry};
