use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CommentId, CommentRecord, NewComment, NewPost, Post, PostId};

pub mod sqlite;

pub use sqlite::SqliteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error")]
    Database(#[source] sqlx::Error),

    /// The row referenced a post or parent comment that no longer exists, or
    /// a post that has been soft-deleted.
    #[error("referenced row does not exist")]
    ForeignKeyViolation,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => {
                RepositoryError::ForeignKeyViolation
            }
            _ => RepositoryError::Database(error),
        }
    }
}

/// Storage capability for posts and their comments.
///
/// Implementations assign ids and timestamps on insert. Reads never return
/// soft-deleted posts; soft-deleted comments are returned as-is.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments of a post, oldest first. Ties on `created_at` are broken
    /// by id.
    async fn fetch_comments_for_post(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentRecord>, RepositoryError>;

    async fn comment_exists(&self, comment_id: CommentId) -> Result<bool, RepositoryError>;

    /// Post the comment belongs to, or `None` if there is no such comment.
    async fn comment_post_id(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<PostId>, RepositoryError>;

    /// False for unknown and soft-deleted posts.
    async fn post_exists(&self, post_id: PostId) -> Result<bool, RepositoryError>;

    /// Fails with `ForeignKeyViolation` unless the post is live and the
    /// parent, if any, exists.
    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, RepositoryError>;

    async fn find_post(&self, post_id: PostId) -> Result<Option<Post>, RepositoryError>;

    /// Live posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, RepositoryError>;

    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError>;

    /// Marks a post deleted. Returns false if it was missing or already gone.
    async fn soft_delete_post(&self, post_id: PostId) -> Result<bool, RepositoryError>;
}
