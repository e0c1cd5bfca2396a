// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mutator for optimistic-mutation tests.
//!
//! Outcomes are scripted in order; when the script runs dry the mutator
//! acknowledges without an entity echo, which is what toggle endpoints do.
//! The gated variant holds mutations in the pending state until released,
//! for double-tap and blocked-submit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use plaza_core::{Entity, MutationIntent, MutationOutcome, Mutator, PlazaError};

/// A scripted implementation of [`Mutator`].
pub struct MockMutator {
    outcomes: Mutex<VecDeque<Result<MutationOutcome, String>>>,
    calls: Mutex<Vec<MutationIntent>>,
    gate: Option<Semaphore>,
}

impl MockMutator {
    /// A mutator whose calls complete immediately.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// A mutator whose calls block until [`MockMutator::release`] is
    /// called, one permit per call.
    pub fn gated() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        }
    }

    /// Scripts the next mutation to return the canonical `entity`.
    pub async fn enqueue_entity(&self, entity: Entity) {
        self.outcomes
            .lock()
            .await
            .push_back(Ok(MutationOutcome::Entity(entity)));
    }

    /// Scripts the next mutation to acknowledge without an entity echo.
    pub async fn enqueue_ack(&self) {
        self.outcomes.lock().await.push_back(Ok(MutationOutcome::Ack));
    }

    /// Scripts the next mutation to fail.
    pub async fn enqueue_error(&self, message: &str) {
        self.outcomes.lock().await.push_back(Err(message.to_string()));
    }

    /// Releases `n` gated mutations.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of remote calls issued so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Every intent the coordinator issued, in call order.
    pub async fn calls(&self) -> Vec<MutationIntent> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockMutator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mutator for MockMutator {
    async fn mutate(&self, intent: &MutationIntent) -> Result<MutationOutcome, PlazaError> {
        self.calls.lock().await.push(intent.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate never closes").forget();
        }

        match self.outcomes.lock().await.pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(PlazaError::mutation(message)),
            None => Ok(MutationOutcome::Ack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::entity;
    use plaza_core::{EntityId, MutationKind};

    fn intent() -> MutationIntent {
        MutationIntent::new(EntityId::from("p1"), MutationKind::Bookmark)
    }

    #[tokio::test]
    async fn outcomes_are_scripted_in_order() {
        let mutator = MockMutator::new();
        mutator.enqueue_entity(entity("p1")).await;
        mutator.enqueue_error("rejected").await;

        assert!(matches!(
            mutator.mutate(&intent()).await,
            Ok(MutationOutcome::Entity(_))
        ));
        assert!(mutator.mutate(&intent()).await.is_err());
        // Script exhausted: acknowledges like a toggle endpoint.
        assert!(matches!(
            mutator.mutate(&intent()).await,
            Ok(MutationOutcome::Ack)
        ));
    }

    #[tokio::test]
    async fn calls_are_recorded_for_assertion() {
        let mutator = MockMutator::new();
        mutator.mutate(&intent()).await.unwrap();

        let calls = mutator.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, EntityId::from("p1"));
        assert_eq!(calls[0].kind, MutationKind::Bookmark);
    }
}
