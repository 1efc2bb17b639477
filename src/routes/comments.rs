use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};

use super::AppState;
use crate::error::ApiError;
use crate::models::{CreateComment, PostId};
use crate::routes::auth::extract_current_user;

pub fn comments_routes() -> Router<AppState> {
    Router::new().route("/{post_id}/comments", post(create_comment))
}

/// Responds with the flat comment; clients re-fetch the post for the thread.
async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<PostId>, PathRejection>,
    payload: Result<Json<CreateComment>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let current_user = extract_current_user(&state.secret_key, &headers)?;
    let Path(post_id) = path?;
    let Json(input) = payload?;

    let content = input.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Comment content is required"));
    }

    let comment = state
        .comments
        .create_comment(post_id, current_user, content.to_string(), input.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
