use std::sync::Arc;

use thiserror::Error;

use crate::models::{CommentNode, CommentRecord, NewPost, Post, PostId, PostWithComments, UserId};
use crate::repository::{CommentRepository, RepositoryError};
use crate::thread;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post {0} not found")]
    PostNotFound(PostId),

    #[error("not the author of this post")]
    NotAuthor,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Clone)]
pub struct PostsService {
    repo: Arc<dyn CommentRepository>,
}

impl PostsService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_post(
        &self,
        author_id: UserId,
        title: String,
        content: String,
    ) -> Result<Post, PostError> {
        let post = self
            .repo
            .insert_post(NewPost {
                user_id: author_id,
                title,
                content,
            })
            .await?;

        tracing::info!(post_id = %post.id, "post created");
        Ok(post)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, PostError> {
        Ok(self.repo.list_posts().await?)
    }

    /// Loads a post with its comments arranged into reply threads.
    ///
    /// Soft-deleted comments stay in the thread with their content blanked so
    /// their replies remain reachable.
    pub async fn get_post_with_comment_tree(
        &self,
        post_id: PostId,
    ) -> Result<PostWithComments, PostError> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or(PostError::PostNotFound(post_id))?;

        let records: Vec<CommentRecord> = self
            .repo
            .fetch_comments_for_post(post_id)
            .await?
            .into_iter()
            .map(CommentRecord::redact_if_deleted)
            .collect();

        let comments = thread::assemble(&records);
        tracing::debug!(
            post_id = %post_id,
            fetched = records.len(),
            top_level = comments.len(),
            max_depth = comments.iter().map(CommentNode::depth).max().unwrap_or(0),
            "assembled comment threads"
        );

        Ok(PostWithComments { post, comments })
    }

    /// Soft-deletes a post. Only its author may do this.
    pub async fn delete_post(&self, post_id: PostId, user_id: UserId) -> Result<(), PostError> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or(PostError::PostNotFound(post_id))?;

        if post.user_id != user_id {
            return Err(PostError::NotAuthor);
        }

        if !self.repo.soft_delete_post(post_id).await? {
            return Err(PostError::PostNotFound(post_id));
        }

        tracing::info!(post_id = %post_id, "post deleted");
        Ok(())
    }
}
