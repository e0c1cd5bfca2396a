// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store seam used by the mutation coordinator.

use async_trait::async_trait;

use crate::types::{Entity, EntityId};

/// What the mutation coordinator needs from a local collection.
///
/// Implemented by both the flat page store and the thread store, so the
/// same coordinator can toggle a reaction on a feed post or on an
/// arbitrary-depth reply without knowing which shape holds it.
///
/// Every method is atomic with respect to the store's visible state.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Token carrying whatever this store needs to undo a removal at its
    /// original position (for thread stores, the removed subtree run).
    type Removed: Send;

    /// Current local copy of the entity, if present.
    async fn entity(&self, id: &EntityId) -> Option<Entity>;

    /// Replaces the stored entity in place, preserving its position.
    /// Returns `false` when the ID is not present locally.
    async fn replace(&self, id: &EntityId, entity: Entity) -> bool;

    /// Removes the entity (and, for tree-shaped stores, its descendants),
    /// returning a token that can restore it. `None` when absent.
    async fn remove(&self, id: &EntityId) -> Option<Self::Removed>;

    /// Restores a prior removal at its captured position.
    async fn restore(&self, removed: Self::Removed);

    /// Appends a confirmed new entity at the tail of the collection.
    async fn append(&self, entity: Entity);
}
