use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::service::{CommentError, PostError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Internal(#[from] RepositoryError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) | ApiError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CommentError> for ApiError {
    fn from(error: CommentError) -> Self {
        match error {
            CommentError::PostNotFound(_) => ApiError::NotFound("Post not found"),
            CommentError::ParentNotFound(_) => ApiError::NotFound("Parent comment not found"),
            CommentError::Repository(error) => ApiError::Internal(error),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(error: PostError) -> Self {
        match error {
            PostError::PostNotFound(_) => ApiError::NotFound("Post not found"),
            PostError::NotAuthor => ApiError::Forbidden("Not authorized to delete this post"),
            PostError::Repository(error) => ApiError::Internal(error),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        ApiError::BadRequest("Invalid request body")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected path parameter");
        ApiError::BadRequest("Invalid path parameter")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            ApiError::Internal(error) => {
                tracing::error!(?error, "internal server error");
                "Internal server error".to_string()
            }
            ApiError::Serialization(error) => {
                tracing::error!(?error, "failed to encode response");
                "Internal server error".to_string()
            }
            other => {
                tracing::info!("returning error to client: {other}");
                other.to_string()
            }
        };

        (
            self.status_code(),
            Json(serde_json::json!({ "detail": detail })),
        )
            .into_response()
    }
}
