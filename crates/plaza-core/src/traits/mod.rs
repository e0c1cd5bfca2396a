// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the boundaries of the sync layer.
//!
//! The transport side (HTTP client, authentication, transfer-object
//! parsing) lives behind [`source::PageSource`], [`source::SnapshotSource`],
//! and [`source::Mutator`]. The store side — what the mutation coordinator
//! needs from a local collection — lives behind [`store::EntityStore`].

pub mod source;
pub mod store;

pub use source::{Mutator, PageSource, SnapshotSource};
pub use store::EntityStore;
