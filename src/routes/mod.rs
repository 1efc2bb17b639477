pub mod auth;
pub mod comments;
pub mod posts;

use std::sync::Arc;

use axum::{Router, response::IntoResponse, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::service::{CommentWriter, PostsService};

pub use comments::comments_routes;
pub use posts::posts_routes;

#[derive(Clone)]
pub struct AppState {
    pub posts: PostsService,
    pub comments: CommentWriter,
    pub secret_key: Arc<str>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/posts", posts_routes().merge(comments_routes()))
        .route("/api/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    axum::Json(serde_json::json!({"status": "healthy"}))
}
