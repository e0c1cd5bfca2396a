// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic mutation coordinator.
//!
//! Applies a mutation to cached state immediately, issues the remote call,
//! and reconciles on completion: commit (optionally adopting the server's
//! canonical entity) or roll back to the snapshot captured when the
//! mutation was admitted. One mutation per (target, kind-class) may be in
//! flight; duplicates are rejected synchronously, never queued, which is
//! what prevents the rapid-double-tap toggle from desyncing client state.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use plaza_core::{
    Entity, EntityId, EntityStore, MutationClass, MutationIntent, MutationKind, MutationOutcome,
    Mutator, PlazaError, Reaction,
};

/// How a toggle or delete concluded when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The mutation was applied locally and confirmed remotely.
    Applied(MutationKind),
    /// The target was not present in the local store. This is a benign race
    /// with a poll merge (the item vanished between render and tap), so it
    /// is a no-op, not an error.
    TargetMissing,
}

/// Coordinates optimistic mutations against one surface's store.
///
/// Constructed per surface with its store, the remote mutator, and the
/// signed-in actor's ID; holds no global state.
pub struct MutationCoordinator<S: EntityStore> {
    store: Arc<S>,
    remote: Arc<dyn Mutator>,
    /// The signed-in user; reaction membership checks are scoped to it.
    actor_id: String,
    /// Pending (target, class) slots. An entry here is the Pending state of
    /// that slot's state machine.
    in_flight: Mutex<HashSet<(EntityId, MutationClass)>>,
}

impl<S: EntityStore> MutationCoordinator<S> {
    pub fn new(store: Arc<S>, remote: Arc<dyn Mutator>, actor_id: impl Into<String>) -> Self {
        Self {
            store,
            remote,
            actor_id: actor_id.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Whether a mutation for this slot is pending. Surfaces use this to
    /// grey out the corresponding affordance.
    pub async fn pending(&self, target: &EntityId, class: MutationClass) -> bool {
        self.in_flight
            .lock()
            .await
            .contains(&(target.clone(), class))
    }

    /// Admits a mutation into the Pending state, or rejects it synchronously
    /// when its slot is taken.
    async fn admit(&self, target: &EntityId, class: MutationClass) -> Result<(), PlazaError> {
        let mut in_flight = self.in_flight.lock().await;
        if !in_flight.insert((target.clone(), class)) {
            debug!(entity = %target, %class, "mutation slot taken, rejecting");
            return Err(PlazaError::MutationInFlight {
                target: target.clone(),
                class,
            });
        }
        Ok(())
    }

    async fn settle(&self, target: &EntityId, class: MutationClass) {
        self.in_flight.lock().await.remove(&(target.clone(), class));
    }

    /// Toggles the actor's reaction with `emoji` on `target`.
    ///
    /// Whether this reacts or unreacts is decided by scanning the reaction
    /// list of the snapshot captured on admission — not live store state,
    /// which a poll merge may advance while the call is pending. The
    /// optimistic entry uses a placeholder ID; a canonical entity returned
    /// by the server replaces the whole target on confirmation.
    pub async fn toggle_reaction(
        &self,
        target: &EntityId,
        emoji: &str,
    ) -> Result<ApplyOutcome, PlazaError> {
        self.admit(target, MutationClass::Reaction).await?;
        let result = self.toggle_reaction_pending(target, emoji).await;
        self.settle(target, MutationClass::Reaction).await;
        result
    }

    async fn toggle_reaction_pending(
        &self,
        target: &EntityId,
        emoji: &str,
    ) -> Result<ApplyOutcome, PlazaError> {
        let Some(snapshot) = self.store.entity(target).await else {
            warn!(entity = %target, "reaction toggle targets an id not present locally, ignoring");
            return Ok(ApplyOutcome::TargetMissing);
        };

        let already_reacted = snapshot.has_reaction(emoji, &self.actor_id);
        let kind = if already_reacted {
            MutationKind::Unreact {
                emoji: emoji.to_string(),
            }
        } else {
            MutationKind::React {
                emoji: emoji.to_string(),
            }
        };

        let mut optimistic = snapshot.clone();
        if already_reacted {
            optimistic
                .reactions
                .retain(|r| !(r.emoji == emoji && r.reactor_id == self.actor_id));
        } else {
            optimistic
                .reactions
                .push(Reaction::placeholder(emoji, &self.actor_id));
        }
        self.store.replace(target, optimistic).await;

        self.confirm_or_revert(target, kind, snapshot).await
    }

    /// Toggles the bookmark flag on `target`.
    pub async fn toggle_bookmark(&self, target: &EntityId) -> Result<ApplyOutcome, PlazaError> {
        self.admit(target, MutationClass::Bookmark).await?;
        let result = self.toggle_bookmark_pending(target).await;
        self.settle(target, MutationClass::Bookmark).await;
        result
    }

    async fn toggle_bookmark_pending(
        &self,
        target: &EntityId,
    ) -> Result<ApplyOutcome, PlazaError> {
        let Some(snapshot) = self.store.entity(target).await else {
            warn!(entity = %target, "bookmark toggle targets an id not present locally, ignoring");
            return Ok(ApplyOutcome::TargetMissing);
        };

        let kind = if snapshot.bookmarked {
            MutationKind::Unbookmark
        } else {
            MutationKind::Bookmark
        };

        let mut optimistic = snapshot.clone();
        optimistic.bookmarked = !snapshot.bookmarked;
        self.store.replace(target, optimistic).await;

        self.confirm_or_revert(target, kind, snapshot).await
    }

    /// Issues the remote call for an already-applied toggle and reconciles.
    async fn confirm_or_revert(
        &self,
        target: &EntityId,
        kind: MutationKind,
        snapshot: Entity,
    ) -> Result<ApplyOutcome, PlazaError> {
        let intent = MutationIntent::new(target.clone(), kind.clone());
        match self.remote.mutate(&intent).await {
            Ok(MutationOutcome::Entity(canonical)) => {
                self.store.replace(target, canonical).await;
                Ok(ApplyOutcome::Applied(kind))
            }
            Ok(MutationOutcome::Ack) => Ok(ApplyOutcome::Applied(kind)),
            Err(err) => {
                // The pre-mutation snapshot is retained for exactly this:
                // put the entity back the way the user saw it.
                self.store.replace(target, snapshot).await;
                warn!(entity = %target, %kind, error = %err, "mutation failed, optimistic change reverted");
                Err(err)
            }
        }
    }

    /// Deletes `target`, removing it (and its descendants, in thread
    /// stores) locally first and restoring the removed span at its old
    /// position when the remote call fails.
    pub async fn delete(&self, target: &EntityId) -> Result<ApplyOutcome, PlazaError> {
        self.admit(target, MutationClass::Delete).await?;
        let result = self.delete_pending(target).await;
        self.settle(target, MutationClass::Delete).await;
        result
    }

    async fn delete_pending(&self, target: &EntityId) -> Result<ApplyOutcome, PlazaError> {
        let Some(removed) = self.store.remove(target).await else {
            warn!(entity = %target, "delete targets an id not present locally, ignoring");
            return Ok(ApplyOutcome::TargetMissing);
        };

        let intent = MutationIntent::new(target.clone(), MutationKind::Delete);
        match self.remote.mutate(&intent).await {
            Ok(_) => Ok(ApplyOutcome::Applied(MutationKind::Delete)),
            Err(err) => {
                self.store.restore(removed).await;
                warn!(entity = %target, error = %err, "delete failed, removal reverted");
                Err(err)
            }
        }
    }

    /// Sends a new message (or creates a post) in `conversation`.
    ///
    /// No optimism here: nothing is shown until the server confirms, and
    /// the Pending slot is what blocks the submit affordance (see
    /// [`MutationCoordinator::pending`]). On confirmation the created
    /// entity is appended at the tail; surfaces that place replies under a
    /// parent do that placement themselves with the returned entity.
    pub async fn send(&self, conversation: &EntityId, body: &str) -> Result<Entity, PlazaError> {
        self.admit(conversation, MutationClass::Send).await?;
        let result = self.send_pending(conversation, body).await;
        self.settle(conversation, MutationClass::Send).await;
        result
    }

    async fn send_pending(
        &self,
        conversation: &EntityId,
        body: &str,
    ) -> Result<Entity, PlazaError> {
        let intent = MutationIntent::new(
            conversation.clone(),
            MutationKind::Send {
                body: body.to_string(),
            },
        );
        match self.remote.mutate(&intent).await {
            Ok(MutationOutcome::Entity(created)) => {
                self.store.append(created.clone()).await;
                debug!(conversation = %conversation, id = %created.id, "send confirmed");
                Ok(created)
            }
            Ok(MutationOutcome::Ack) => {
                warn!(conversation = %conversation, "send acknowledged without an entity");
                Err(PlazaError::Internal(
                    "send was acknowledged without the created entity".to_string(),
                ))
            }
            Err(err) => {
                warn!(conversation = %conversation, error = %err, "send failed");
                Err(err)
            }
        }
    }
}
