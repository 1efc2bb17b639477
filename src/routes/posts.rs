use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use super::AppState;
use crate::error::ApiError;
use crate::models::{CreatePost, PostId};
use crate::routes::auth::extract_current_user;

pub fn posts_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{post_id}", get(get_post).delete(delete_post))
}

async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_posts().await?;
    Ok(Json(posts))
}

async fn get_post(
    State(state): State<AppState>,
    path: Result<Path<PostId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(post_id) = path?;
    let post = state.posts.get_post_with_comment_tree(post_id).await?;

    // Encoded by hand: a thread can nest deeper than serde's derive could
    // recurse.
    let body = post.to_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let current_user = extract_current_user(&state.secret_key, &headers)?;
    let Json(input) = payload?;

    let title = input.title.trim();
    let content = input.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(ApiError::BadRequest("Title and content are required"));
    }

    let post = state
        .posts
        .create_post(current_user, title.to_string(), content.to_string())
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<PostId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let current_user = extract_current_user(&state.secret_key, &headers)?;
    let Path(post_id) = path?;

    state.posts.delete_post(post_id, current_user).await?;

    Ok(Json(serde_json::json!({"message": "Post deleted successfully"})))
}
