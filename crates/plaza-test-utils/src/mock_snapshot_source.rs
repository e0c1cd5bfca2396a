// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock snapshot source for polling tests.
//!
//! Models a live thread on the server: the test sets what the current
//! snapshot is, and every poll fetch observes it. Fetches are counted when
//! they start, so a gated fetch is visible while still blocked.

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use plaza_core::{Entity, PlazaError, SnapshotSource};

/// A scripted implementation of [`SnapshotSource`].
pub struct MockSnapshotSource {
    current: Mutex<Result<Vec<Entity>, String>>,
    fetches: Mutex<usize>,
    gate: Option<Semaphore>,
}

impl MockSnapshotSource {
    /// A source whose fetches complete immediately with an empty thread.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Ok(Vec::new())),
            fetches: Mutex::new(0),
            gate: None,
        }
    }

    /// A source whose fetches block until [`MockSnapshotSource::release`]
    /// is called, one permit per fetch.
    pub fn gated() -> Self {
        Self {
            current: Mutex::new(Ok(Vec::new())),
            fetches: Mutex::new(0),
            gate: Some(Semaphore::new(0)),
        }
    }

    /// Sets the snapshot every subsequent fetch returns.
    pub async fn set_snapshot(&self, snapshot: Vec<Entity>) {
        *self.current.lock().await = Ok(snapshot);
    }

    /// Makes every subsequent fetch fail.
    pub async fn set_error(&self, message: &str) {
        *self.current.lock().await = Err(message.to_string());
    }

    /// Releases `n` gated fetches.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of fetches started so far (including gated ones still open).
    pub async fn fetch_count(&self) -> usize {
        *self.fetches.lock().await
    }
}

impl Default for MockSnapshotSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource<Entity> for MockSnapshotSource {
    async fn fetch_snapshot(&self) -> Result<Vec<Entity>, PlazaError> {
        *self.fetches.lock().await += 1;

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate never closes").forget();
        }

        match &*self.current.lock().await {
            Ok(snapshot) => Ok(snapshot.clone()),
            Err(message) => Err(PlazaError::fetch(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{entity, ids_of};

    #[tokio::test]
    async fn fetch_observes_the_current_snapshot() {
        let source = MockSnapshotSource::new();
        source.set_snapshot(vec![entity("m1")]).await;

        assert_eq!(ids_of(&source.fetch_snapshot().await.unwrap()), ["m1"]);

        source.set_snapshot(vec![entity("m1"), entity("m2")]).await;
        assert_eq!(
            ids_of(&source.fetch_snapshot().await.unwrap()),
            ["m1", "m2"]
        );
        assert_eq!(source.fetch_count().await, 2);
    }

    #[tokio::test]
    async fn error_state_fails_fetches_until_cleared() {
        let source = MockSnapshotSource::new();
        source.set_error("unreachable").await;
        assert!(source.fetch_snapshot().await.is_err());

        source.set_snapshot(Vec::new()).await;
        assert!(source.fetch_snapshot().await.is_ok());
    }
}
