mod config;
mod db;
mod error;
mod models;
mod repository;
mod routes;
mod service;
mod thread;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use repository::SqliteRepository;
use routes::{AppState, build_router};
use service::{CommentWriter, PostsService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comment_threads=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let pool = db::init_db(&config.database_url, config.db_max_connections).await?;
    tracing::info!(database_url = %config.database_url, "Database initialized");

    let repo = Arc::new(SqliteRepository::new(pool));
    let state = AppState {
        posts: PostsService::new(repo.clone()),
        comments: CommentWriter::new(repo, config.allow_cross_post_replies),
        secret_key: Arc::from(config.secret_key.as_str()),
    };

    let app = build_router(state);

    tracing::info!("Server running on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
