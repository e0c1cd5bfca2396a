// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the collection, thread, mutation, and poll crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Globally unique, stable, opaque identifier of a remote entity.
///
/// Equality and deduplication are always by ID, never by structural
/// comparison of the entity bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque pagination token issued by the server.
///
/// A cursor is scoped to one (collection, filter) pair; it must never be
/// reused across differently-filtered requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(pub String);

/// Opaque query key identifying one filtered view of a collection.
///
/// Changing the filter invalidates the current cursor and all accumulated
/// pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter(pub String);

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One ordered page of items as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<K> {
    /// Items in server-issued order. The client never re-sorts.
    pub items: Vec<K>,
    /// Cursor for the next page, if the server issued one.
    pub next_cursor: Option<Cursor>,
    /// Whether more pages exist beyond this one.
    pub has_more: bool,
}

/// Access to the stable ID of a synchronized item.
///
/// Stores are generic over this trait so feeds, threads, conversations, and
/// notification lists all share the same pagination and merge machinery.
pub trait Keyed {
    fn id(&self) -> &EntityId;
}

/// A single reaction entry on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Server-issued reaction ID, or a client-synthesized placeholder while
    /// an optimistic toggle is pending.
    pub id: String,
    pub emoji: String,
    pub reactor_id: String,
}

impl Reaction {
    /// Builds a placeholder reaction for optimistic local application.
    ///
    /// The placeholder ID is a fresh UUID; the server's canonical entry
    /// replaces it when a confirmed entity is merged back.
    pub fn placeholder(emoji: &str, reactor_id: &str) -> Self {
        Self {
            id: format!("local-{}", uuid::Uuid::new_v4()),
            emoji: emoji.to_string(),
            reactor_id: reactor_id.to_string(),
        }
    }
}

/// The normalized shape of a remote-identified object held locally: a feed
/// post, a reply, a message, or a notification.
///
/// Upstream transfer objects are validated and normalized at the transport
/// boundary; this layer never sees raw wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub author_id: String,
    pub body: String,
    /// RFC 3339 creation timestamp as issued by the server.
    pub created_at: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub bookmarked: bool,
    /// Opaque JSON payload carried through for the rendering layer.
    #[serde(default)]
    pub metadata: Option<String>,
}

impl Entity {
    /// Whether `reactor_id` already has a reaction with `emoji` on this
    /// entity, judged against this entity's current reaction list.
    pub fn has_reaction(&self, emoji: &str, reactor_id: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.emoji == emoji && r.reactor_id == reactor_id)
    }
}

impl Keyed for Entity {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Keyed for EntityId {
    fn id(&self) -> &EntityId {
        self
    }
}

/// Groups mutation kinds that contend for the same in-flight slot.
///
/// At most one mutation per (target, class) may be pending; a second request
/// for the same slot is rejected, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MutationClass {
    Reaction,
    Bookmark,
    Delete,
    Send,
}

/// A point mutation requested by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    React { emoji: String },
    Unreact { emoji: String },
    Bookmark,
    Unbookmark,
    Delete,
    Send { body: String },
}

impl MutationKind {
    /// The in-flight contention class of this kind.
    pub fn class(&self) -> MutationClass {
        match self {
            MutationKind::React { .. } | MutationKind::Unreact { .. } => MutationClass::Reaction,
            MutationKind::Bookmark | MutationKind::Unbookmark => MutationClass::Bookmark,
            MutationKind::Delete => MutationClass::Delete,
            MutationKind::Send { .. } => MutationClass::Send,
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::React { emoji } => write!(f, "react({emoji})"),
            MutationKind::Unreact { emoji } => write!(f, "unreact({emoji})"),
            MutationKind::Bookmark => f.write_str("bookmark"),
            MutationKind::Unbookmark => f.write_str("unbookmark"),
            MutationKind::Delete => f.write_str("delete"),
            MutationKind::Send { .. } => f.write_str("send"),
        }
    }
}

/// A mutation addressed to one remote entity.
///
/// For `Send`, the target identifies the conversation or feed the new item
/// is created in rather than an existing entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationIntent {
    pub target: EntityId,
    pub kind: MutationKind,
}

impl MutationIntent {
    pub fn new(target: impl Into<EntityId>, kind: MutationKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// Result of a successful remote mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The server returned the canonical updated (or created) entity.
    Entity(Entity),
    /// The server acknowledged without echoing an entity. Local optimistic
    /// state stands as applied.
    Ack,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn entity(id: &str) -> Entity {
        Entity {
            id: EntityId::from(id),
            author_id: "u1".to_string(),
            body: "hello".to_string(),
            created_at: "2026-08-01T10:00:00Z".to_string(),
            reactions: Vec::new(),
            bookmarked: false,
            metadata: None,
        }
    }

    #[test]
    fn entity_id_equality_and_display() {
        let a = EntityId::from("p1");
        let b = EntityId("p1".to_string());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "p1");
    }

    #[test]
    fn kind_maps_to_class() {
        let cases = [
            (
                MutationKind::React {
                    emoji: "❤️".to_string(),
                },
                MutationClass::Reaction,
            ),
            (
                MutationKind::Unreact {
                    emoji: "❤️".to_string(),
                },
                MutationClass::Reaction,
            ),
            (MutationKind::Bookmark, MutationClass::Bookmark),
            (MutationKind::Unbookmark, MutationClass::Bookmark),
            (MutationKind::Delete, MutationClass::Delete),
            (
                MutationKind::Send {
                    body: "hi".to_string(),
                },
                MutationClass::Send,
            ),
        ];
        for (kind, class) in cases {
            assert_eq!(kind.class(), class);
        }
    }

    #[test]
    fn mutation_class_display_round_trips() {
        for class in [
            MutationClass::Reaction,
            MutationClass::Bookmark,
            MutationClass::Delete,
            MutationClass::Send,
        ] {
            let s = class.to_string();
            let parsed = MutationClass::from_str(&s).expect("should parse back");
            assert_eq!(class, parsed);
        }
    }

    #[test]
    fn has_reaction_matches_emoji_and_reactor() {
        let mut e = entity("p1");
        e.reactions.push(Reaction {
            id: "r1".to_string(),
            emoji: "👍".to_string(),
            reactor_id: "me".to_string(),
        });

        assert!(e.has_reaction("👍", "me"));
        assert!(!e.has_reaction("👍", "someone-else"));
        assert!(!e.has_reaction("🎉", "me"));
    }

    #[test]
    fn placeholder_reactions_have_unique_local_ids() {
        let a = Reaction::placeholder("👍", "me");
        let b = Reaction::placeholder("👍", "me");
        assert!(a.id.starts_with("local-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn entity_serde_defaults_optional_fields() {
        let json = r#"{
            "id": "p1",
            "author_id": "u1",
            "body": "hello",
            "created_at": "2026-08-01T10:00:00Z"
        }"#;
        let e: Entity = serde_json::from_str(json).expect("should deserialize");
        assert!(e.reactions.is_empty());
        assert!(!e.bookmarked);
        assert!(e.metadata.is_none());
    }
}
