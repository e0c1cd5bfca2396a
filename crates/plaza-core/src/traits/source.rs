// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote-source traits implemented by the transport layer.

use async_trait::async_trait;

use crate::error::PlazaError;
use crate::types::{Cursor, Filter, MutationIntent, MutationOutcome, Page};

/// Fetches one page of a cursor-paginated collection.
///
/// Implementations must be stable-ordered and cursor-stable for a fixed
/// filter: paginating the same filter with the cursors this source issued
/// yields a consistent, non-overlapping walk of the collection.
#[async_trait]
pub trait PageSource<K>: Send + Sync {
    /// Fetches the page at `cursor` (`None` for the first page) under
    /// `filter`, at most `limit` items.
    async fn fetch_page(
        &self,
        filter: &Filter,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<K>, PlazaError>;
}

/// Fetches the full current listing of a bounded live collection.
///
/// Used by the polling synchronizer. The result has whole-replace
/// semantics, not incremental-delta semantics.
#[async_trait]
pub trait SnapshotSource<K>: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<K>, PlazaError>;
}

/// Performs a point mutation against the remote source of truth.
///
/// The remote side is idempotent enough that client-side duplicate
/// suppression (one in-flight mutation per target and class) suffices;
/// no idempotency keys are sent.
#[async_trait]
pub trait Mutator: Send + Sync {
    async fn mutate(&self, intent: &MutationIntent) -> Result<MutationOutcome, PlazaError>;
}
