// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval snapshot polling for live surfaces.
//!
//! A poll session fetches the full current snapshot of a bounded thread on
//! a fixed interval and merges it into the collection store. The merge rule
//! lives in the store ([`PageStore::merge_snapshot`]); this module owns the
//! scheduling: no overlapping polls, skipped (never queued) ticks, and
//! synchronous cancellation with discard of any result that completes after
//! the session was stopped.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use plaza_collection::PageStore;
use plaza_core::{EntityId, Keyed, SnapshotSource};

/// Describes one live surface's polling: which collection it refreshes and
/// how often. Exactly one session exists per visible live surface; hiding
/// the surface stops it and a new visit starts a fresh one.
#[derive(Debug, Clone)]
pub struct PollSession {
    /// Collection identifier, used for logging only.
    pub target: String,
    /// Fixed interval between poll ticks.
    pub interval: Duration,
}

impl PollSession {
    pub fn new(target: impl Into<String>, interval_ms: u64) -> Self {
        Self {
            target: target.into(),
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Starts the session against `store`, fetching snapshots from
    /// `source`. The first fetch lands one full interval after the call.
    pub fn spawn<K>(
        self,
        store: Arc<PageStore<K>>,
        source: Arc<dyn SnapshotSource<K>>,
    ) -> PollHandle
    where
        K: Keyed + Clone + Send + Sync + 'static,
    {
        let token = CancellationToken::new();
        let task = tokio::spawn(run(self, store, source, token.clone()));
        PollHandle { token, task }
    }
}

/// Handle to a running poll session.
pub struct PollHandle {
    token: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl PollHandle {
    /// Stops the session. Returns immediately; an in-flight fetch is
    /// allowed to complete, but its result is discarded.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the runner task to exit. Teardown/test helper; not needed
    /// for correctness.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

async fn run<K>(
    session: PollSession,
    store: Arc<PageStore<K>>,
    source: Arc<dyn SnapshotSource<K>>,
    token: CancellationToken,
) where
    K: Keyed + Clone + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(session.interval);
    // A tick that would fire while the previous fetch is still outstanding
    // is skipped, not queued.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The interval's first tick completes immediately; consume it so the
    // first fetch lands one full interval after the surface appears.
    ticker.tick().await;

    info!(collection = %session.target, interval_ms = session.interval.as_millis() as u64, "poll session started");
    let mut last_seen_tail: Option<EntityId> = None;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // The fetch is awaited to completion even if the session is stopped
        // meanwhile; the activity check below throws the late result away.
        match source.fetch_snapshot().await {
            Ok(snapshot) => {
                if token.is_cancelled() {
                    debug!(collection = %session.target, "session stopped during fetch, discarding result");
                    break;
                }
                let tail = snapshot.last().map(|item| item.id().clone());
                if store.merge_snapshot(snapshot).await {
                    if tail != last_seen_tail {
                        debug!(collection = %session.target, tail = ?tail.as_ref().map(|id| &id.0), "snapshot merged, tail advanced");
                    }
                    last_seen_tail = tail;
                } else {
                    debug!(collection = %session.target, "snapshot unchanged, merge skipped");
                }
            }
            // Background refresh failures are dropped; the surface keeps its
            // current state and the next tick tries again.
            Err(err) => {
                debug!(collection = %session.target, error = %err, "poll fetch failed, keeping current state");
            }
        }
    }

    info!(collection = %session.target, "poll session stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_core::{Entity, Filter};
    use plaza_test_utils::{entity, ids_of, page, MockPageSource, MockSnapshotSource};

    const INTERVAL_MS: u64 = 1000;

    async fn live_store(ids: &[&str]) -> Arc<PageStore<Entity>> {
        let source = Arc::new(MockPageSource::new());
        source.enqueue_page("thread", page(ids, None, false)).await;
        let store = Arc::new(PageStore::tail_following(source, 25));
        store.load_first_page(Filter::from("thread")).await.unwrap();
        store
    }

    fn sleep_ms(ms: u64) -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn identical_snapshot_causes_no_visible_mutation() {
        let store = live_store(&["m1", "m2"]).await;
        let revision = store.revision().await;

        // Same count and tail, different body: the weak rule skips it.
        let mut same_shape = vec![entity("m1"), entity("m2")];
        same_shape[0].body = "edited elsewhere".to_string();
        let source = Arc::new(MockSnapshotSource::new());
        source.set_snapshot(same_shape).await;

        let handle = PollSession::new("thread", INTERVAL_MS).spawn(store.clone(), source.clone());
        sleep_ms(3 * INTERVAL_MS + 100).await;
        handle.stop();
        handle.wait().await;

        assert!(source.fetch_count().await >= 2, "poll should have ticked");
        assert_eq!(store.revision().await, revision);
        assert_eq!(store.items().await[0].body, entity("m1").body);
    }

    #[tokio::test(start_paused = true)]
    async fn grown_snapshot_replaces_collection() {
        let store = live_store(&["m1", "m2"]).await;

        let source = Arc::new(MockSnapshotSource::new());
        source
            .set_snapshot(vec![entity("m1"), entity("m2"), entity("m3")])
            .await;

        let handle = PollSession::new("thread", INTERVAL_MS).spawn(store.clone(), source.clone());
        sleep_ms(INTERVAL_MS + 100).await;
        handle.stop();
        handle.wait().await;

        assert_eq!(ids_of(&store.items().await), ["m1", "m2", "m3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_keeps_state_and_next_tick_recovers() {
        let store = live_store(&["m1"]).await;

        let source = Arc::new(MockSnapshotSource::new());
        source.set_error("gateway timeout").await;

        let handle = PollSession::new("thread", INTERVAL_MS).spawn(store.clone(), source.clone());
        sleep_ms(INTERVAL_MS + 100).await;
        assert_eq!(ids_of(&store.items().await), ["m1"]);

        source.set_snapshot(vec![entity("m1"), entity("m2")]).await;
        sleep_ms(INTERVAL_MS).await;
        handle.stop();
        handle.wait().await;

        assert_eq!(ids_of(&store.items().await), ["m1", "m2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_future_ticks() {
        let store = live_store(&["m1"]).await;
        let source = Arc::new(MockSnapshotSource::new());
        source.set_snapshot(vec![entity("m1")]).await;

        let handle = PollSession::new("thread", INTERVAL_MS).spawn(store.clone(), source.clone());
        sleep_ms(INTERVAL_MS + 100).await;
        let fetches = source.fetch_count().await;

        handle.stop();
        assert!(handle.is_stopped());
        handle.wait().await;
        sleep_ms(5 * INTERVAL_MS).await;

        assert_eq!(source.fetch_count().await, fetches);
    }

    #[tokio::test(start_paused = true)]
    async fn result_completing_after_stop_is_discarded() {
        let store = live_store(&["m1"]).await;

        let source = Arc::new(MockSnapshotSource::gated());
        source.set_snapshot(vec![entity("m1"), entity("m2")]).await;

        let handle = PollSession::new("thread", INTERVAL_MS).spawn(store.clone(), source.clone());
        // Let the first tick fire; the fetch is now held open by the gate.
        sleep_ms(INTERVAL_MS + 100).await;
        assert_eq!(source.fetch_count().await, 1);

        handle.stop();
        source.release(1);
        handle.wait().await;

        // The fetch completed after the stop, so its snapshot never landed.
        assert_eq!(ids_of(&store.items().await), ["m1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_during_outstanding_fetch_are_skipped() {
        let store = live_store(&["m1"]).await;

        let source = Arc::new(MockSnapshotSource::gated());
        source.set_snapshot(vec![entity("m1"), entity("m2")]).await;

        let handle = PollSession::new("thread", INTERVAL_MS).spawn(store.clone(), source.clone());
        // First tick starts a fetch that stays blocked across several
        // further intervals.
        sleep_ms(4 * INTERVAL_MS).await;
        assert_eq!(
            source.fetch_count().await,
            1,
            "overlapping ticks must be skipped, not queued"
        );

        source.release(1);
        sleep_ms(100).await;
        handle.stop();
        source.release(8);
        handle.wait().await;

        assert_eq!(ids_of(&store.items().await), ["m1", "m2"]);
    }
}
