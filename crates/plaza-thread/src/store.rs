// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mutable store over a materialized reply thread.
//!
//! Holds the flat reply list behind an async mutex so mutation application
//! and reloads are atomic with respect to the rendered state, and exposes
//! the store seam the mutation coordinator targets.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use plaza_core::{Entity, EntityId, EntityStore};

use crate::flat::{self, FlatReply, ReplyNode};

#[derive(Debug)]
struct ThreadState {
    entries: Vec<FlatReply<Entity>>,
    revision: u64,
}

/// One post's reply thread, owned by the surface rendering it.
pub struct ThreadStore {
    inner: Mutex<ThreadState>,
}

impl ThreadStore {
    /// Creates an empty store, to be filled by [`ThreadStore::set_forest`]
    /// once the thread loads.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ThreadState {
                entries: Vec::new(),
                revision: 0,
            }),
        }
    }

    /// Creates a store from a freshly fetched forest.
    pub fn from_forest(forest: Vec<ReplyNode<Entity>>) -> Self {
        Self {
            inner: Mutex::new(ThreadState {
                entries: flat::flatten(forest),
                revision: 0,
            }),
        }
    }

    /// Replaces the whole thread with a refetched forest.
    pub async fn set_forest(&self, forest: Vec<ReplyNode<Entity>>) {
        let mut state = self.inner.lock().await;
        state.entries = flat::flatten(forest);
        state.revision += 1;
    }

    /// The flat entries in render order.
    pub async fn entries(&self) -> Vec<FlatReply<Entity>> {
        self.inner.lock().await.entries.clone()
    }

    /// Re-nests the current entries into the server shape.
    pub async fn forest(&self) -> Vec<ReplyNode<Entity>> {
        flat::renest(self.inner.lock().await.entries.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Re-render signal: moves exactly when the visible thread changes.
    pub async fn revision(&self) -> u64 {
        self.inner.lock().await.revision
    }

    /// Inserts a confirmed reply as the last child of `parent`, directly
    /// after the parent's existing descendant run. Returns `false` with a
    /// diagnostic when the parent is no longer present (it raced a removal).
    pub async fn insert_under(&self, parent: &EntityId, entity: Entity) -> bool {
        let mut state = self.inner.lock().await;
        let Some(parent_index) = flat::locate(&state.entries, parent) else {
            debug!(parent = %parent, "reply parent no longer present, dropping insert");
            return false;
        };
        let depth = state.entries[parent_index].depth + 1;
        let end = flat::subtree_end(&state.entries, parent_index);
        state.entries.insert(end, FlatReply { entity, depth });
        state.revision += 1;
        true
    }
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Removal token for a thread: the removed contiguous subtree run and the
/// position it started at.
#[derive(Debug, Clone)]
pub struct RemovedSubtree {
    start: usize,
    entries: Vec<FlatReply<Entity>>,
}

#[async_trait]
impl EntityStore for ThreadStore {
    type Removed = RemovedSubtree;

    async fn entity(&self, id: &EntityId) -> Option<Entity> {
        let state = self.inner.lock().await;
        flat::locate(&state.entries, id).map(|index| state.entries[index].entity.clone())
    }

    async fn replace(&self, id: &EntityId, entity: Entity) -> bool {
        let mut state = self.inner.lock().await;
        let replaced = flat::apply_mutation(&mut state.entries, id, |current| *current = entity);
        if replaced {
            state.revision += 1;
        }
        replaced
    }

    async fn remove(&self, id: &EntityId) -> Option<RemovedSubtree> {
        let mut state = self.inner.lock().await;
        let (start, entries) = flat::remove_subtree(&mut state.entries, id)?;
        state.revision += 1;
        Some(RemovedSubtree { start, entries })
    }

    async fn restore(&self, removed: RemovedSubtree) {
        let mut state = self.inner.lock().await;
        let at = removed.start.min(state.entries.len());
        state.entries.splice(at..at, removed.entries);
        state.revision += 1;
    }

    async fn append(&self, entity: Entity) {
        let mut state = self.inner.lock().await;
        state.entries.push(FlatReply { entity, depth: 0 });
        state.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_test_utils::entity;

    fn forest() -> Vec<ReplyNode<Entity>> {
        vec![
            ReplyNode::with_children(
                entity("a"),
                vec![ReplyNode::with_children(
                    entity("b"),
                    vec![ReplyNode::new(entity("c"))],
                )],
            ),
            ReplyNode::new(entity("d")),
        ]
    }

    fn ids(entries: &[FlatReply<Entity>]) -> Vec<String> {
        entries.iter().map(|e| e.entity.id.0.clone()).collect()
    }

    #[tokio::test]
    async fn forest_round_trips_through_store() {
        let store = ThreadStore::from_forest(forest());
        assert_eq!(ids(&store.entries().await), ["a", "b", "c", "d"]);
        assert_eq!(store.forest().await, forest());
    }

    #[tokio::test]
    async fn replace_keeps_depth_and_position() {
        let store = ThreadStore::from_forest(forest());
        let mut edited = entity("b");
        edited.bookmarked = true;

        assert!(EntityStore::replace(&store, &EntityId::from("b"), edited).await);

        let entries = store.entries().await;
        assert_eq!(ids(&entries), ["a", "b", "c", "d"]);
        assert_eq!(entries[1].depth, 1);
        assert!(entries[1].entity.bookmarked);
    }

    #[tokio::test]
    async fn remove_and_restore_round_trips_subtree() {
        let store = ThreadStore::from_forest(forest());

        let removed = EntityStore::remove(&store, &EntityId::from("b"))
            .await
            .unwrap();
        assert_eq!(ids(&store.entries().await), ["a", "d"]);

        EntityStore::restore(&store, removed).await;
        assert_eq!(ids(&store.entries().await), ["a", "b", "c", "d"]);
        assert_eq!(store.forest().await, forest());
    }

    #[tokio::test]
    async fn insert_under_lands_after_descendant_run() {
        let store = ThreadStore::from_forest(forest());

        assert!(store.insert_under(&EntityId::from("a"), entity("e")).await);

        let entries = store.entries().await;
        assert_eq!(ids(&entries), ["a", "b", "c", "e", "d"]);
        assert_eq!(entries[3].depth, 1);
    }

    #[tokio::test]
    async fn insert_under_missing_parent_is_dropped() {
        let store = ThreadStore::from_forest(forest());
        assert!(!store.insert_under(&EntityId::from("zz"), entity("e")).await);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn revision_moves_only_on_visible_change() {
        let store = ThreadStore::from_forest(forest());
        let revision = store.revision().await;

        assert!(!EntityStore::replace(&store, &EntityId::from("zz"), entity("zz")).await);
        assert_eq!(store.revision().await, revision);

        assert!(EntityStore::replace(&store, &EntityId::from("d"), entity("d")).await);
        assert!(store.revision().await > revision);
    }

    #[tokio::test]
    async fn append_adds_root_level_entry() {
        let store = ThreadStore::from_forest(forest());
        EntityStore::append(&store, entity("e")).await;

        let entries = store.entries().await;
        assert_eq!(entries.last().unwrap().depth, 0);
        assert_eq!(ids(&entries), ["a", "b", "c", "d", "e"]);
    }
}
