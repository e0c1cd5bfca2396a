// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between server-shaped nested reply trees and the flat,
//! depth-annotated list used for rendering and targeted mutation.
//!
//! The flat form keeps one invariant at all times: a node's descendants are
//! exactly the contiguous run of strictly deeper entries immediately after
//! it. That makes subtree operations slice operations, with no pointer
//! chasing and no aliasing.

use serde::{Deserialize, Serialize};

use plaza_core::{EntityId, Keyed};

/// A node of a server-shaped reply tree.
///
/// Depth is implicit: root nodes are at depth 0 and every child is one
/// deeper than its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyNode<E> {
    pub entity: E,
    #[serde(default)]
    pub children: Vec<ReplyNode<E>>,
}

impl<E> ReplyNode<E> {
    pub fn new(entity: E) -> Self {
        Self {
            entity,
            children: Vec::new(),
        }
    }

    pub fn with_children(entity: E, children: Vec<ReplyNode<E>>) -> Self {
        Self { entity, children }
    }
}

/// One entry of the flattened reply list.
///
/// `depth` is the logical depth. Rendering caps *visual* indentation at a
/// constant, but the logical depth recorded here is never capped — it is
/// what keeps re-nesting and subtree removal correct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatReply<E> {
    pub entity: E,
    pub depth: usize,
}

/// Flattens a forest depth-first, parents before children, siblings in
/// server order.
pub fn flatten<E>(forest: Vec<ReplyNode<E>>) -> Vec<FlatReply<E>> {
    let mut flat = Vec::new();
    let mut stack: Vec<(ReplyNode<E>, usize)> =
        forest.into_iter().rev().map(|node| (node, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let ReplyNode { entity, children } = node;
        flat.push(FlatReply { entity, depth });
        for child in children.into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    flat
}

/// Rebuilds the forest from a flat list by walking it in order and closing
/// nodes off a depth-indexed stack.
///
/// Exact structural inverse of [`flatten`] for any well-formed input (first
/// entry at depth 0, each entry at most one deeper than its predecessor).
pub fn renest<E>(flat: Vec<FlatReply<E>>) -> Vec<ReplyNode<E>> {
    let mut roots = Vec::new();
    // Path of currently open nodes; the node at index i sits at depth i.
    let mut open: Vec<ReplyNode<E>> = Vec::new();

    let close_to = |open: &mut Vec<ReplyNode<E>>, roots: &mut Vec<ReplyNode<E>>, depth: usize| {
        while open.len() > depth {
            let node = open.pop().expect("open path is non-empty");
            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }
    };

    for FlatReply { entity, depth } in flat {
        close_to(&mut open, &mut roots, depth);
        open.push(ReplyNode::new(entity));
    }
    close_to(&mut open, &mut roots, 0);

    roots
}

/// Finds the index of `id` in the flat list.
///
/// Linear scan; forests here are bounded by a single post's comments.
pub fn locate<E: Keyed>(flat: &[FlatReply<E>], id: &EntityId) -> Option<usize> {
    flat.iter().position(|entry| entry.entity.id() == id)
}

/// Replaces the entity at `id` with `updater(entity)`, leaving its depth and
/// position unchanged. Returns `false` when the ID is not present.
pub fn apply_mutation<E: Keyed>(
    flat: &mut [FlatReply<E>],
    id: &EntityId,
    updater: impl FnOnce(&mut E),
) -> bool {
    match locate(flat, id) {
        Some(index) => {
            updater(&mut flat[index].entity);
            true
        }
        None => false,
    }
}

/// Computes the end (exclusive) of the descendant run of the node at
/// `index`: the entries immediately following it with strictly greater
/// depth.
pub fn subtree_end<E>(flat: &[FlatReply<E>], index: usize) -> usize {
    let depth = flat[index].depth;
    let mut end = index + 1;
    while end < flat.len() && flat[end].depth > depth {
        end += 1;
    }
    end
}

/// Removes the node at `id` together with its descendants, preserving the
/// relative order of everything else. Returns the removed run and the
/// position it held, or `None` when the ID is absent.
pub fn remove_subtree<E: Keyed>(
    flat: &mut Vec<FlatReply<E>>,
    id: &EntityId,
) -> Option<(usize, Vec<FlatReply<E>>)> {
    let start = locate(flat, id)?;
    let end = subtree_end(flat, start);
    let removed: Vec<FlatReply<E>> = flat.drain(start..end).collect();
    Some((start, removed))
}
