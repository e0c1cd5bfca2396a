// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Plaza sync layer: scripted mock collaborators and
//! deterministic entity fixtures.
//!
//! The mocks implement the collaborator traits from `plaza-core` exactly as
//! a transport layer would, with scripting and call capture on top. Gated
//! variants hold their remote calls open until released, which is how the
//! in-flight races (duplicate loads, double-taps, stop-during-poll) are
//! exercised deterministically.

pub mod fixtures;
pub mod mock_mutator;
pub mod mock_page_source;
pub mod mock_snapshot_source;

pub use fixtures::{entity, entity_with_reactions, ids_of, page, reaction};
pub use mock_mutator::MockMutator;
pub use mock_page_source::MockPageSource;
pub use mock_snapshot_source::MockSnapshotSource;
