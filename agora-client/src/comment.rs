use std::collections::HashMap;

use crate::{
    api::{Comment, CommentId},
    CommentSort,
};

/// Assembles the flat comment list of a post into a reply tree.
///
/// Top-level comments are ordered by `sort`, replies always oldest first; both
/// sorts are stable. Comments whose parent is not in `comments` are dropped,
/// and so is anything hanging below them, including parent cycles. A comment
/// id listed twice is only kept once.
pub fn build_tree(comments: Vec<Comment>, sort: CommentSort) -> Vec<Comment> {
    let total = comments.len();
    let mut children = HashMap::<CommentId, Vec<usize>>::with_capacity(total);
    let mut roots = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent_id {
            None => roots.push(i),
            Some(p) => children.entry(p).or_default().push(i),
        }
    }
    roots.sort_by(|&a, &b| sort.compare(&comments[a], &comments[b]));
    for kids in children.values_mut() {
        kids.sort_by_key(|&i| comments[i].created_at);
    }

    // Preorder walk, remembering for each visited comment where it goes
    let mut seen_ids = HashMap::with_capacity(total);
    let mut preorder = Vec::with_capacity(total);
    let mut parent_of = vec![None; total];
    let mut stack = roots.iter().rev().map(|&r| (r, None)).collect::<Vec<_>>();
    while let Some((i, parent)) = stack.pop() {
        let id = comments[i].id;
        if seen_ids.insert(id, i).is_some() {
            continue;
        }
        parent_of[i] = parent;
        preorder.push(i);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev().map(|&k| (k, Some(i))));
        }
    }

    let dropped = total - preorder.len();
    if dropped > 0 {
        tracing::warn!(dropped, total, "dropping comments not attached to any thread");
    }

    // Children come after their parent in preorder, so attaching in reverse
    // order finishes every subtree before it gets moved into its parent
    let mut slots = comments.into_iter().map(Some).collect::<Vec<_>>();
    let mut replies = vec![Vec::new(); total];
    let mut top = Vec::with_capacity(roots.len());
    for &i in preorder.iter().rev() {
        let Some(mut c) = slots[i].take() else {
            continue;
        };
        c.replies = std::mem::take(&mut replies[i]);
        c.replies.reverse();
        match parent_of[i] {
            Some(p) => replies[p].push(c),
            None => top.push(c),
        }
    }
    top.reverse();
    top
}
