use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ids::{CommentId, PostId, UserId};

/// A comment as stored: flat, with a nullable back-reference to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CommentRecord {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub user_id: UserId,
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CommentRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Blanks the body of a soft-deleted comment so it can stay in a thread
    /// as a placeholder for its replies.
    pub fn redact_if_deleted(mut self) -> Self {
        if self.is_deleted() {
            self.content.clear();
        }
        self
    }
}

/// A comment inside an assembled thread. Children are oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn from_record(record: &CommentRecord) -> Self {
        Self {
            id: record.id,
            content: record.content.clone(),
            post_id: record.post_id,
            user_id: record.user_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Length of the longest root-to-leaf path, counting `self` as 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Appends the subtree to `out` as a JSON object with a nested
    /// `children` array, walking an explicit stack instead of recursing per
    /// level.
    pub fn write_json(&self, out: &mut Vec<u8>) -> serde_json::Result<()> {
        open_node(out, self)?;

        let mut stack = vec![self.children.iter()];
        let mut first = true;
        while let Some(siblings) = stack.last_mut() {
            match siblings.next() {
                Some(child) => {
                    if !first {
                        out.push(b',');
                    }
                    open_node(out, child)?;
                    stack.push(child.children.iter());
                    first = true;
                }
                None => {
                    stack.pop();
                    out.extend_from_slice(b"]}");
                    first = false;
                }
            }
        }

        Ok(())
    }
}

/// Flat fields of a node, in wire order.
#[derive(Serialize)]
struct NodeFields<'a> {
    id: CommentId,
    content: &'a str,
    post_id: PostId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Writes `{<fields>,"children":[` for one node.
fn open_node(out: &mut Vec<u8>, node: &CommentNode) -> serde_json::Result<()> {
    serde_json::to_writer(
        &mut *out,
        &NodeFields {
            id: node.id,
            content: &node.content,
            post_id: node.post_id,
            user_id: node.user_id,
            created_at: node.created_at,
            updated_at: node.updated_at,
            deleted_at: node.deleted_at,
        },
    )?;
    // Reopen the object to append the children array.
    out.pop();
    out.extend_from_slice(b",\"children\":[");
    Ok(())
}

/// Appends a forest as a JSON array of threads.
pub fn write_forest_json(forest: &[CommentNode], out: &mut Vec<u8>) -> serde_json::Result<()> {
    out.push(b'[');
    for (index, node) in forest.iter().enumerate() {
        if index > 0 {
            out.push(b',');
        }
        node.write_json(out)?;
    }
    out.push(b']');
    Ok(())
}

// Threads can be arbitrarily deep; the default drop glue would recurse once
// per level.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Validated input for a new comment; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

/// Total node count across a forest.
pub fn forest_len(forest: &[CommentNode]) -> usize {
    forest.iter().map(CommentNode::subtree_len).sum()
}
