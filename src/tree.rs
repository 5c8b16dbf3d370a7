// src/tree.rs

use std::collections::HashMap;

use crate::error::BoardError;
use crate::models::post::{Post, PostNode};

/// Build a nested reply tree from a flat thread scan.
///
/// The repository delivers rows ordered depth-ascending then id-ascending,
/// which is what makes single-pass linking possible: every parent has been
/// seen before any of its children. Input is nevertheless re-sorted by
/// `(depth, id)` before linking, so a caller handing over rows in another
/// order gets the identical tree rather than undefined structure; on
/// already-ordered input the sort degenerates to a verification pass.
///
/// Tombstoned rows are linked like any other so that live replies stay
/// anchored; callers that want them hidden apply [`prune_deleted`] on the
/// result. Returns `NotFound` when `root_id` does not occur in the rows.
pub fn assemble(mut rows: Vec<Post>, root_id: i64) -> Result<PostNode, BoardError> {
    rows.sort_by_key(|post| (post.depth, post.id));

    let mut index: HashMap<i64, usize> = HashMap::with_capacity(rows.len());
    let mut child_slots: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];

    for (slot, post) in rows.iter().enumerate() {
        if let Some(parent_id) = post.parent_id {
            // The parent, if present at all, occupies an earlier slot, so
            // every child slot recorded here is strictly greater than its
            // parent's.
            if let Some(&parent_slot) = index.get(&parent_id) {
                child_slots[parent_slot].push(slot);
            }
        }
        index.insert(post.id, slot);
    }

    let root_slot = *index.get(&root_id).ok_or(BoardError::NotFound)?;

    // Attach children back to front. Children always live in later slots
    // than their parent, so by the time a slot is processed its own
    // children are already fully built.
    let mut nodes: Vec<Option<PostNode>> = rows
        .into_iter()
        .map(|post| {
            Some(PostNode {
                post,
                children: Vec::new(),
            })
        })
        .collect();

    for slot in (0..nodes.len()).rev() {
        let children: Vec<PostNode> = child_slots[slot]
            .iter()
            .filter_map(|&child| nodes[child].take())
            .collect();
        if let Some(node) = nodes[slot].as_mut() {
            node.children = children;
        }
    }

    nodes[root_slot].take().ok_or(BoardError::NotFound)
}

/// Drop tombstoned nodes that anchor nothing: a deleted post is removed
/// unless some transitive child is still live, in which case it stays as a
/// placeholder so those children keep their position in the thread.
/// Returns `None` when the whole subtree is dead.
pub fn prune_deleted(node: PostNode) -> Option<PostNode> {
    let PostNode { post, children } = node;

    let children: Vec<PostNode> = children.into_iter().filter_map(prune_deleted).collect();

    if post.is_deleted() && children.is_empty() {
        return None;
    }

    Some(PostNode { post, children })
}
