//! Rebuilds reply threads from the flat comment rows of a single post.
//!
//! Input must already be restricted to one post and ordered oldest first.
//! Nothing here sorts: children inherit the input order, so a thread reads in
//! the order the store returned it.

use std::collections::HashMap;

use crate::models::{CommentId, CommentNode, CommentRecord, forest_len};

/// Builds the ordered forest of top-level comments for one post.
///
/// A comment is kept only if following its `parent_id` chain inside
/// `records` ends at a top-level comment. Orphans (parent missing from the
/// set), self-replies and members of reply cycles are dropped together with
/// everything below them. Construction is iterative, so thread depth is not
/// limited by the call stack.
pub fn assemble(records: &[CommentRecord]) -> Vec<CommentNode> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut slots: Vec<Option<CommentNode>> = Vec::with_capacity(records.len());
    let mut index_by_id: HashMap<CommentId, usize> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        slots.push(Some(CommentNode::from_record(record)));
        index_by_id.insert(record.id, index);
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (index, record) in records.iter().enumerate() {
        match record.parent_id {
            None => roots.push(index),
            Some(parent_id) if parent_id == record.id => {
                tracing::debug!(comment_id = %record.id, "dropping self-referencing comment");
            }
            Some(parent_id) => match index_by_id.get(&parent_id) {
                Some(&parent) => children[parent].push(index),
                None => {
                    tracing::debug!(
                        comment_id = %record.id,
                        parent_id = %parent_id,
                        "dropping comment whose parent is not in this thread"
                    );
                }
            },
        }
    }

    // Every index sits in exactly one list, so a walk from the roots visits
    // each reachable node once and never enters a cycle.
    let mut preorder = Vec::with_capacity(records.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        preorder.push(index);
        stack.extend(children[index].iter().rev().copied());
    }

    // Children follow their parent in preorder, so walking it backwards
    // finishes every subtree before its parent claims it.
    for &index in preorder.iter().rev() {
        let finished: Vec<CommentNode> = children[index]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(node) = slots[index].as_mut() {
            node.children = finished;
        }
    }

    let forest: Vec<CommentNode> = roots
        .iter()
        .filter_map(|&root| slots[root].take())
        .collect();

    let dropped = records.len() - forest_len(&forest);
    if dropped > 0 {
        tracing::debug!(
            dropped,
            total = records.len(),
            "comments unreachable from any top-level comment"
        );
    }

    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostId, UserId};
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn id(n: u128) -> CommentId {
        CommentId::from(Uuid::from_u128(n))
    }

    fn at(t: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(t)
    }

    fn record(n: u128, parent: Option<u128>, t: i64) -> CommentRecord {
        CommentRecord {
            id: id(n),
            content: format!("comment {n}"),
            post_id: PostId::from(Uuid::from_u128(7)),
            user_id: UserId::from(Uuid::from_u128(9)),
            parent_id: parent.map(id),
            created_at: at(t),
            updated_at: at(t),
            deleted_at: None,
        }
    }

    fn ids(nodes: &[CommentNode]) -> Vec<CommentId> {
        nodes.iter().map(|node| node.id).collect()
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(assemble(&[]).is_empty());
    }

    #[test]
    fn builds_nested_thread_in_creation_order() {
        let records = vec![
            record(1, None, 1),
            record(2, Some(1), 2),
            record(3, Some(1), 3),
            record(4, Some(2), 4),
        ];

        let forest = assemble(&records);

        assert_eq!(ids(&forest), vec![id(1)]);
        let top = &forest[0];
        assert_eq!(ids(&top.children), vec![id(2), id(3)]);
        assert_eq!(ids(&top.children[0].children), vec![id(4)]);
        assert!(top.children[0].children[0].children.is_empty());
        assert!(top.children[1].children.is_empty());
    }

    #[test]
    fn copies_record_fields_verbatim() {
        let mut deleted = record(1, None, 1);
        deleted.deleted_at = Some(at(5));
        let forest = assemble(&[deleted.clone()]);

        let node = &forest[0];
        assert_eq!(node.content, deleted.content);
        assert_eq!(node.post_id, deleted.post_id);
        assert_eq!(node.user_id, deleted.user_id);
        assert_eq!(node.created_at, deleted.created_at);
        assert_eq!(node.deleted_at, deleted.deleted_at);
    }

    #[test]
    fn orphan_is_dropped_not_promoted() {
        let forest = assemble(&[record(1, Some(99), 1)]);
        assert!(forest.is_empty());
    }

    #[test]
    fn orphan_subtree_is_dropped_with_it() {
        let records = vec![
            record(1, None, 1),
            record(2, Some(99), 2),
            record(3, Some(2), 3),
        ];

        let forest = assemble(&records);

        assert_eq!(ids(&forest), vec![id(1)]);
        assert_eq!(forest_len(&forest), 1);
    }

    #[test]
    fn self_reply_never_becomes_its_own_child() {
        let records = vec![
            record(1, None, 1),
            record(2, Some(2), 2),
            record(3, Some(2), 3),
        ];

        let forest = assemble(&records);

        assert_eq!(ids(&forest), vec![id(1)]);
        assert!(forest[0].children.is_empty());
        assert_eq!(forest_len(&forest), 1);
    }

    #[test]
    fn reply_cycles_are_dropped() {
        let records = vec![
            record(1, Some(2), 1),
            record(2, Some(1), 2),
            record(3, Some(1), 3),
            record(4, None, 4),
        ];

        let forest = assemble(&records);

        assert_eq!(ids(&forest), vec![id(4)]);
        assert_eq!(forest_len(&forest), 1);
    }

    #[test]
    fn keeps_input_order_instead_of_sorting() {
        // Timestamps deliberately disagree with the input order.
        let records = vec![
            record(1, None, 10),
            record(2, Some(1), 9),
            record(3, None, 1),
            record(4, Some(1), 2),
        ];

        let forest = assemble(&records);

        assert_eq!(ids(&forest), vec![id(1), id(3)]);
        assert_eq!(ids(&forest[0].children), vec![id(2), id(4)]);
    }

    #[test]
    fn children_match_input_subsequence_per_parent() {
        let records = vec![
            record(1, None, 1),
            record(2, None, 2),
            record(3, Some(1), 3),
            record(4, Some(2), 4),
            record(5, Some(1), 5),
            record(6, Some(3), 6),
            record(7, Some(2), 7),
            record(8, Some(1), 8),
        ];

        let forest = assemble(&records);

        let mut stack: Vec<&CommentNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            let expected: Vec<CommentId> = records
                .iter()
                .filter(|r| r.parent_id == Some(node.id))
                .map(|r| r.id)
                .collect();
            assert_eq!(ids(&node.children), expected);
            assert!(
                node.children
                    .windows(2)
                    .all(|pair| pair[0].created_at <= pair[1].created_at)
            );
            stack.extend(node.children.iter());
        }
        assert_eq!(forest_len(&forest), records.len());
    }

    #[test]
    fn node_count_never_exceeds_input() {
        let clean = vec![record(1, None, 1), record(2, Some(1), 2), record(3, Some(2), 3)];
        assert_eq!(forest_len(&assemble(&clean)), clean.len());

        let mut dirty = clean.clone();
        dirty.push(record(4, Some(4), 4));
        dirty.push(record(5, Some(42), 5));
        assert!(forest_len(&assemble(&dirty)) < dirty.len());
        assert_eq!(forest_len(&assemble(&dirty)), clean.len());
    }

    #[test]
    fn assembling_twice_is_identical() {
        let records = vec![
            record(1, None, 1),
            record(2, Some(1), 2),
            record(3, Some(7), 3),
            record(4, None, 4),
            record(5, Some(4), 5),
        ];

        assert_eq!(assemble(&records), assemble(&records));
    }

    #[test]
    fn deep_chain_does_not_overflow_the_stack() {
        const DEPTH: u128 = 100_000;
        let records: Vec<CommentRecord> = (1..=DEPTH)
            .map(|n| record(n, (n > 1).then(|| n - 1), n as i64))
            .collect();

        let forest = assemble(&records);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].depth(), DEPTH as usize);
        assert_eq!(forest_len(&forest), DEPTH as usize);
        drop(forest);
    }

    #[test]
    fn duplicate_ids_do_not_panic() {
        // Undefined shape, but it must still terminate.
        let records = vec![
            record(1, None, 1),
            record(1, None, 2),
            record(2, Some(1), 3),
        ];

        let forest = assemble(&records);

        assert!(forest_len(&forest) <= records.len());
    }
}
