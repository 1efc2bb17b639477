use std::sync::Arc;

use thiserror::Error;

use crate::models::{CommentId, CommentRecord, NewComment, PostId, UserId};
use crate::repository::{CommentRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("post {0} not found")]
    PostNotFound(PostId),

    #[error("parent comment {0} not found")]
    ParentNotFound(CommentId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Write path for comments: checks that the post and parent exist, then
/// hands the insert to the repository.
#[derive(Clone)]
pub struct CommentWriter {
    repo: Arc<dyn CommentRepository>,
    allow_cross_post_replies: bool,
}

impl CommentWriter {
    /// With `allow_cross_post_replies` off, a parent must belong to the same
    /// post as the new comment.
    pub fn new(repo: Arc<dyn CommentRepository>, allow_cross_post_replies: bool) -> Self {
        Self {
            repo,
            allow_cross_post_replies,
        }
    }

    /// Returns the stored flat record. Callers that need the thread shape
    /// re-read the post.
    pub async fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: String,
        parent_id: Option<CommentId>,
    ) -> Result<CommentRecord, CommentError> {
        if !self.repo.post_exists(post_id).await? {
            return Err(CommentError::PostNotFound(post_id));
        }

        if let Some(parent_id) = parent_id {
            self.ensure_parent(post_id, parent_id).await?;
        }

        let new_comment = NewComment {
            post_id,
            user_id: author_id,
            content,
            parent_id,
        };

        match self.repo.insert_comment(new_comment).await {
            Ok(record) => {
                tracing::info!(
                    comment_id = %record.id,
                    post_id = %post_id,
                    parent_id = ?parent_id,
                    "comment created"
                );
                Ok(record)
            }
            // The post or parent went away between the checks and the insert.
            Err(RepositoryError::ForeignKeyViolation) => {
                tracing::warn!(
                    post_id = %post_id,
                    parent_id = ?parent_id,
                    "comment insert rejected by foreign key"
                );
                if !self.repo.post_exists(post_id).await? {
                    return Err(CommentError::PostNotFound(post_id));
                }
                Err(match parent_id {
                    Some(parent_id) => CommentError::ParentNotFound(parent_id),
                    None => CommentError::PostNotFound(post_id),
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn ensure_parent(&self, post_id: PostId, parent_id: CommentId) -> Result<(), CommentError> {
        if self.allow_cross_post_replies {
            return match self.repo.comment_exists(parent_id).await? {
                true => Ok(()),
                false => Err(CommentError::ParentNotFound(parent_id)),
            };
        }

        match self.repo.comment_post_id(parent_id).await? {
            Some(owner) if owner == post_id => Ok(()),
            Some(owner) => {
                tracing::debug!(
                    parent_id = %parent_id,
                    parent_post_id = %owner,
                    post_id = %post_id,
                    "rejecting reply to a comment on another post"
                );
                Err(CommentError::ParentNotFound(parent_id))
            }
            None => Err(CommentError::ParentNotFound(parent_id)),
        }
    }
}
