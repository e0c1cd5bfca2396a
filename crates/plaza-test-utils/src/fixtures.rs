// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic entity fixtures.
//!
//! Fixtures are pure functions of their inputs so that tests can compare a
//! rebuilt fixture against stored state.

use plaza_core::{Cursor, Entity, EntityId, Page, Reaction};

const FIXTURE_TIMESTAMP: &str = "2026-08-01T10:00:00Z";

/// A plain entity with no reactions and no bookmark.
pub fn entity(id: &str) -> Entity {
    Entity {
        id: EntityId::from(id),
        author_id: "author-1".to_string(),
        body: format!("body of {id}"),
        created_at: FIXTURE_TIMESTAMP.to_string(),
        reactions: Vec::new(),
        bookmarked: false,
        metadata: None,
    }
}

/// An entity pre-populated with the given reaction list.
pub fn entity_with_reactions(id: &str, reactions: Vec<Reaction>) -> Entity {
    Entity {
        reactions,
        ..entity(id)
    }
}

/// A server-issued reaction entry.
pub fn reaction(id: &str, emoji: &str, reactor_id: &str) -> Reaction {
    Reaction {
        id: id.to_string(),
        emoji: emoji.to_string(),
        reactor_id: reactor_id.to_string(),
    }
}

/// A page of plain entities in the given order.
pub fn page(ids: &[&str], next_cursor: Option<&str>, has_more: bool) -> Page<Entity> {
    Page {
        items: ids.iter().map(|id| entity(id)).collect(),
        next_cursor: next_cursor.map(|c| Cursor(c.to_string())),
        has_more,
    }
}

/// The IDs of a slice of entities, in order, for compact assertions.
pub fn ids_of(items: &[Entity]) -> Vec<String> {
    items.iter().map(|item| item.id.0.clone()).collect()
}
