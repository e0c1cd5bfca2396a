// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Plaza client synchronization layer.
//!
//! This crate provides the normalized entity model, pagination and mutation
//! types, the collaborator traits implemented by the transport layer, and
//! the shared error type. The component crates (collection, thread,
//! mutation, poll) build on these definitions.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PlazaError;
pub use traits::{EntityStore, Mutator, PageSource, SnapshotSource};
pub use types::{
    Cursor, Entity, EntityId, Filter, Keyed, MutationClass, MutationIntent, MutationKind,
    MutationOutcome, Page, Reaction,
};
