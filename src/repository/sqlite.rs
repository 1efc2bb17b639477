use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{CommentRepository, RepositoryError};
use crate::models::{CommentId, CommentRecord, NewComment, NewPost, Post, PostId};

const COMMENT_COLUMNS: &str =
    "id, content, post_id, user_id, parent_id, created_at, updated_at, deleted_at";
const POST_COLUMNS: &str = "id, title, content, user_id, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteRepository {
    async fn fetch_comments_for_post(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentRecord>, RepositoryError> {
        let comments = sqlx::query_as::<_, CommentRecord>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? ORDER BY created_at ASC, id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn comment_exists(&self, comment_id: CommentId) -> Result<bool, RepositoryError> {
        let row = sqlx::query_scalar::<_, i64>("SELECT 1 FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn comment_post_id(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<PostId>, RepositoryError> {
        let post_id = sqlx::query_scalar::<_, PostId>("SELECT post_id FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post_id)
    }

    async fn post_exists(&self, post_id: PostId) -> Result<bool, RepositoryError> {
        let row = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM posts WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, RepositoryError> {
        let now = Utc::now();
        let record = CommentRecord {
            id: CommentId::new(),
            content: comment.content,
            post_id: comment.post_id,
            user_id: comment.user_id,
            parent_id: comment.parent_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        // The foreign key cannot see soft deletes, so liveness of the post is
        // checked in the same statement.
        let result = sqlx::query(
            r#"INSERT INTO comments (id, content, post_id, user_id, parent_id, created_at, updated_at)
               SELECT ?, ?, ?, ?, ?, ?, ?
               WHERE EXISTS (SELECT 1 FROM posts WHERE id = ? AND deleted_at IS NULL)"#,
        )
        .bind(record.id)
        .bind(&record.content)
        .bind(record.post_id)
        .bind(record.user_id)
        .bind(record.parent_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.post_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::ForeignKeyViolation);
        }

        Ok(record)
    }

    async fn find_post(&self, post_id: PostId) -> Result<Option<Post>, RepositoryError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE deleted_at IS NULL ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let now = Utc::now();
        let post = Post {
            id: PostId::new(),
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            r#"INSERT INTO posts (id, title, content, user_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.user_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    async fn soft_delete_post(&self, post_id: PostId) -> Result<bool, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE posts SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
