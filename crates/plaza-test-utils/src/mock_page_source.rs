// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock page source for deterministic pagination tests.
//!
//! Pages are scripted per filter and consumed in order; every fetch is
//! recorded for assertion. The gated variant holds fetches open until the
//! test releases them, which is how in-flight races are exercised.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use plaza_core::{Cursor, Entity, Filter, Page, PageSource, PlazaError};

/// A scripted implementation of [`PageSource`].
pub struct MockPageSource {
    pages: Mutex<HashMap<String, VecDeque<Result<Page<Entity>, String>>>>,
    calls: Mutex<Vec<(Filter, Option<Cursor>, usize)>>,
    gate: Option<Semaphore>,
}

impl MockPageSource {
    /// A source whose fetches complete immediately.
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// A source whose fetches block until [`MockPageSource::release`] is
    /// called, one permit per fetch.
    pub fn gated() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        }
    }

    /// Scripts the next page returned for `filter`.
    pub async fn enqueue_page(&self, filter: &str, page: Page<Entity>) {
        self.pages
            .lock()
            .await
            .entry(filter.to_string())
            .or_default()
            .push_back(Ok(page));
    }

    /// Scripts the next fetch for `filter` to fail.
    pub async fn enqueue_error(&self, filter: &str, message: &str) {
        self.pages
            .lock()
            .await
            .entry(filter.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Releases `n` gated fetches.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of fetches issued so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Every fetch issued so far: (filter, cursor, limit) in call order.
    pub async fn calls(&self) -> Vec<(Filter, Option<Cursor>, usize)> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockPageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageSource<Entity> for MockPageSource {
    async fn fetch_page(
        &self,
        filter: &Filter,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Entity>, PlazaError> {
        self.calls
            .lock()
            .await
            .push((filter.clone(), cursor.cloned(), limit));

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate never closes").forget();
        }

        let mut pages = self.pages.lock().await;
        match pages.get_mut(&filter.0).and_then(|queue| queue.pop_front()) {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(PlazaError::fetch(message)),
            None => Err(PlazaError::fetch(format!(
                "no scripted page for filter `{}`",
                filter.0
            ))),
        }
    }
}
