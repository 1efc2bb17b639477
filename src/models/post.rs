use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::comment::{CommentNode, write_forest_json};
use super::ids::{PostId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct PostWithComments {
    pub post: Post,
    pub comments: Vec<CommentNode>,
}

impl PostWithComments {
    /// The post's own fields plus a `comments` array of threads. Threads are
    /// written without recursion, so depth is not bounded by the stack.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = serde_json::to_vec(&self.post)?;
        out.pop();
        out.extend_from_slice(b",\"comments\":");
        write_forest_json(&self.comments, &mut out)?;
        out.push(b'}');
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
}
