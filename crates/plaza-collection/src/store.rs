// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor page store: one filtered collection and the serialization of
//! page fetches against it.
//!
//! The store keeps its state behind an async mutex but never holds the lock
//! across a fetch. In-flight guards are checked and set under the lock, the
//! fetch runs lock-free, and the result is applied atomically afterwards. A
//! generation counter detects that the collection was reset while a fetch
//! was outstanding, in which case the stale result is discarded.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use plaza_core::{
    Cursor, Entity, EntityId, EntityStore, Filter, Keyed, Page, PageSource, PlazaError,
};

/// How a load call concluded, for callers that drive pull-to-refresh and
/// infinite-scroll affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched page was applied; `appended` items were new to the
    /// collection.
    Loaded { appended: usize },
    /// Another load for this collection is already in flight; no fetch was
    /// issued. The caller observes the in-flight load's result through the
    /// store.
    AlreadyInFlight,
    /// The collection is exhausted; there is nothing left to fetch.
    Exhausted,
    /// No first page has been applied yet (or the server issued no cursor),
    /// so there is no position to load more from.
    NotLoaded,
    /// The fetch completed after the collection was reset underneath it;
    /// the result was discarded.
    Superseded,
}

#[derive(Debug)]
struct CollectionState<K> {
    filter: Option<Filter>,
    items: Vec<K>,
    ids: HashSet<EntityId>,
    cursor: Option<Cursor>,
    exhausted: bool,
    /// Bumped whenever the accumulated pages are discarded or replaced
    /// wholesale. A fetch that started under an older generation throws its
    /// result away.
    generation: u64,
    /// Bumped on every visible change. Rendering layers use this as their
    /// re-render signal, so a skipped poll merge must not move it.
    revision: u64,
    first_load_in_flight: bool,
    loading_more: bool,
    /// Visible error state. Only cold-start first loads set this; load-more
    /// and poll failures leave it alone.
    load_error: Option<String>,
}

impl<K: Keyed> CollectionState<K> {
    fn new() -> Self {
        Self {
            filter: None,
            items: Vec::new(),
            ids: HashSet::new(),
            cursor: None,
            exhausted: false,
            generation: 0,
            revision: 0,
            first_load_in_flight: false,
            loading_more: false,
            load_error: None,
        }
    }

    /// Discards accumulated pages and the cursor for a new filter.
    fn reset_for(&mut self, filter: Filter) {
        self.filter = Some(filter);
        self.items.clear();
        self.ids.clear();
        self.cursor = None;
        self.exhausted = false;
        self.generation += 1;
        self.revision += 1;
        self.loading_more = false;
        self.load_error = None;
    }

    /// Replaces the collection with one page's items, deduplicated by ID
    /// with the first occurrence winning.
    fn apply_first_page(&mut self, page: Page<K>) -> usize {
        self.items.clear();
        self.ids.clear();
        for item in page.items {
            if self.ids.insert(item.id().clone()) {
                self.items.push(item);
            }
        }
        self.cursor = page.next_cursor;
        self.exhausted = !page.has_more;
        self.generation += 1;
        self.revision += 1;
        self.load_error = None;
        // Any load-more that was outstanding against the previous pages now
        // belongs to a dead generation; release its guard here since its
        // completion will skip flag handling.
        self.loading_more = false;
        self.items.len()
    }

    /// Appends a page's items, skipping IDs already present.
    fn append_page(&mut self, page: Page<K>) -> usize {
        let mut appended = 0;
        for item in page.items {
            if self.ids.insert(item.id().clone()) {
                self.items.push(item);
                appended += 1;
            }
        }
        self.cursor = page.next_cursor;
        self.exhausted = !page.has_more;
        self.revision += 1;
        appended
    }

    fn position(&self, id: &EntityId) -> Option<usize> {
        if !self.ids.contains(id) {
            return None;
        }
        self.items.iter().position(|item| item.id() == id)
    }
}

/// In-memory accumulation of pages for one (endpoint, filter) pair.
///
/// Owned by the UI surface that created it; all visible transitions are
/// atomic, and different surfaces' stores are fully independent.
pub struct PageStore<K> {
    source: Arc<dyn PageSource<K>>,
    page_limit: usize,
    /// Whether out-of-band upserts of unknown IDs append at the tail
    /// (live feeds and conversation threads) or are dropped (finite,
    /// explicitly-paginated views).
    tail_follow: bool,
    inner: Mutex<CollectionState<K>>,
}

impl<K: Keyed + Clone + Send> PageStore<K> {
    /// Creates a store for an explicitly-paginated view.
    pub fn new(source: Arc<dyn PageSource<K>>, page_limit: usize) -> Self {
        Self {
            source,
            page_limit,
            tail_follow: false,
            inner: Mutex::new(CollectionState::new()),
        }
    }

    /// Creates a store for a tail-following live view (chat thread, live
    /// feed): upserts of unknown IDs append at the tail.
    pub fn tail_following(source: Arc<dyn PageSource<K>>, page_limit: usize) -> Self {
        Self {
            source,
            page_limit,
            tail_follow: true,
            inner: Mutex::new(CollectionState::new()),
        }
    }

    /// Loads the first page under `filter`.
    ///
    /// A filter change discards the existing collection and cursor before
    /// fetching. A same-filter call (refresh) keeps the prior items visible
    /// until the replacement page arrives, so a failed refresh leaves them
    /// intact. Duplicate calls while a first load is in flight for the same
    /// filter are ignored.
    pub async fn load_first_page(&self, filter: Filter) -> Result<LoadOutcome, PlazaError> {
        let (generation, cold_start) = {
            let mut state = self.inner.lock().await;
            if state.first_load_in_flight && state.filter.as_ref() == Some(&filter) {
                debug!(filter = %filter.0, "first load already in flight, ignoring");
                return Ok(LoadOutcome::AlreadyInFlight);
            }
            if state.filter.as_ref() != Some(&filter) {
                state.reset_for(filter.clone());
            }
            state.first_load_in_flight = true;
            (state.generation, state.items.is_empty())
        };

        let fetched = self.source.fetch_page(&filter, None, self.page_limit).await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!(filter = %filter.0, "first page superseded by reset, discarding");
            return Ok(LoadOutcome::Superseded);
        }
        state.first_load_in_flight = false;

        match fetched {
            Ok(page) => {
                let applied = state.apply_first_page(page);
                debug!(filter = %filter.0, items = applied, "first page applied");
                Ok(LoadOutcome::Loaded { appended: applied })
            }
            Err(err) => {
                if cold_start {
                    state.load_error = Some(err.to_string());
                }
                warn!(filter = %filter.0, error = %err, "first page load failed");
                Err(err)
            }
        }
    }

    /// Loads the next page using the current cursor.
    ///
    /// No-op while exhausted or while any load is in flight. On failure the
    /// items are left untouched and the loading flag is cleared so the user
    /// may retry; the store's visible error state is not set.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, PlazaError> {
        let (generation, filter, cursor) = {
            let mut state = self.inner.lock().await;
            if state.first_load_in_flight || state.loading_more {
                return Ok(LoadOutcome::AlreadyInFlight);
            }
            if state.exhausted {
                return Ok(LoadOutcome::Exhausted);
            }
            let Some(filter) = state.filter.clone() else {
                return Ok(LoadOutcome::NotLoaded);
            };
            let Some(cursor) = state.cursor.clone() else {
                // No cursor to advance from: first page not applied yet.
                return Ok(LoadOutcome::NotLoaded);
            };
            state.loading_more = true;
            (state.generation, filter, cursor)
        };

        let fetched = self
            .source
            .fetch_page(&filter, Some(&cursor), self.page_limit)
            .await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!(filter = %filter.0, "next page superseded by reset, discarding");
            return Ok(LoadOutcome::Superseded);
        }
        state.loading_more = false;

        match fetched {
            Ok(page) => {
                let appended = state.append_page(page);
                debug!(filter = %filter.0, appended, "next page applied");
                Ok(LoadOutcome::Loaded { appended })
            }
            Err(err) => {
                warn!(filter = %filter.0, error = %err, "next page load failed, collection left untouched");
                Err(err)
            }
        }
    }

    /// Applies an out-of-band change: replaces an existing item in place
    /// (preserving its position), or appends it when this store is
    /// tail-following. Returns whether the collection changed.
    pub async fn upsert(&self, item: K) -> bool {
        let mut state = self.inner.lock().await;
        if let Some(pos) = state.position(item.id()) {
            state.items[pos] = item;
            state.revision += 1;
            return true;
        }
        if self.tail_follow {
            state.ids.insert(item.id().clone());
            state.items.push(item);
            state.revision += 1;
            return true;
        }
        debug!(id = %item.id(), "upsert of unknown id dropped for non-tail collection");
        false
    }

    /// Removes by ID, preserving the order of the remainder. Returns the
    /// removed item and the position it held.
    pub async fn remove(&self, id: &EntityId) -> Option<(usize, K)> {
        let mut state = self.inner.lock().await;
        let pos = state.position(id)?;
        state.ids.remove(id);
        let item = state.items.remove(pos);
        state.revision += 1;
        Some((pos, item))
    }

    /// Re-inserts a previously removed item at its captured position
    /// (clamped to the current length).
    pub async fn insert_at(&self, pos: usize, item: K) {
        let mut state = self.inner.lock().await;
        if !state.ids.insert(item.id().clone()) {
            // Already re-introduced out of band; nothing to restore.
            return;
        }
        let pos = pos.min(state.items.len());
        state.items.insert(pos, item);
        state.revision += 1;
    }

    /// Merges a full polled snapshot.
    ///
    /// The reconciliation rule is intentionally weak: the snapshot replaces
    /// the collection only when the item count or the tail ID differs.
    /// Identical (count, tail) snapshots are skipped without touching the
    /// revision, so unchanged polls cause no re-render. Non-tail edits and
    /// count-preserving insert+delete pairs between polls are therefore not
    /// detected until a stronger signal arrives.
    pub async fn merge_snapshot(&self, snapshot: Vec<K>) -> bool {
        let mut state = self.inner.lock().await;
        let same_count = snapshot.len() == state.items.len();
        let same_tail = match (snapshot.last(), state.items.last()) {
            (Some(a), Some(b)) => a.id() == b.id(),
            (None, None) => true,
            _ => false,
        };
        if same_count && same_tail {
            return false;
        }

        state.items.clear();
        state.ids.clear();
        for item in snapshot {
            if state.ids.insert(item.id().clone()) {
                state.items.push(item);
            }
        }
        state.revision += 1;
        true
    }

    /// Snapshot of the current items, in accumulation order.
    pub async fn items(&self) -> Vec<K> {
        self.inner.lock().await.items.clone()
    }

    /// Current local copy of one item.
    pub async fn get(&self, id: &EntityId) -> Option<K> {
        let state = self.inner.lock().await;
        state.position(id).map(|pos| state.items[pos].clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.items.is_empty()
    }

    pub async fn is_exhausted(&self) -> bool {
        self.inner.lock().await.exhausted
    }

    /// Whether any load (first page or load-more) is in flight.
    pub async fn is_loading(&self) -> bool {
        let state = self.inner.lock().await;
        state.first_load_in_flight || state.loading_more
    }

    pub async fn cursor(&self) -> Option<Cursor> {
        self.inner.lock().await.cursor.clone()
    }

    pub async fn filter(&self) -> Option<Filter> {
        self.inner.lock().await.filter.clone()
    }

    /// The visible error state from a failed cold-start load, if any.
    pub async fn error(&self) -> Option<String> {
        self.inner.lock().await.load_error.clone()
    }

    /// Re-render signal: moves exactly when the visible state changes.
    pub async fn revision(&self) -> u64 {
        self.inner.lock().await.revision
    }
}

/// Removal token for a flat collection: the entity and the position it held.
#[derive(Debug, Clone)]
pub struct RemovedEntry {
    pos: usize,
    entity: Entity,
}

#[async_trait]
impl EntityStore for PageStore<Entity> {
    type Removed = RemovedEntry;

    async fn entity(&self, id: &EntityId) -> Option<Entity> {
        self.get(id).await
    }

    async fn replace(&self, id: &EntityId, entity: Entity) -> bool {
        let mut state = self.inner.lock().await;
        let Some(pos) = state.position(id) else {
            return false;
        };
        if entity.id != *id {
            state.ids.remove(id);
            state.ids.insert(entity.id.clone());
        }
        state.items[pos] = entity;
        state.revision += 1;
        true
    }

    async fn remove(&self, id: &EntityId) -> Option<RemovedEntry> {
        PageStore::remove(self, id)
            .await
            .map(|(pos, entity)| RemovedEntry { pos, entity })
    }

    async fn restore(&self, removed: RemovedEntry) {
        self.insert_at(removed.pos, removed.entity).await;
    }

    async fn append(&self, entity: Entity) {
        let mut state = self.inner.lock().await;
        if let Some(pos) = state.position(&entity.id) {
            // Confirmed entity already merged out of band (poll beat us to
            // it); adopt the canonical copy in place.
            state.items[pos] = entity;
        } else {
            state.ids.insert(entity.id.clone());
            state.items.push(entity);
        }
        state.revision += 1;
    }
}
