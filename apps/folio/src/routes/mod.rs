pub mod health;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::chat::handlers as chat;
use crate::state::AppState;
use crate::view::handlers as pages;

pub fn build_router(state: AppState, assets_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::handle_about))
        .route("/blog", get(pages::handle_blog_list))
        .route("/blog/:id", get(pages::handle_blog_post))
        // Content API
        .route("/api/v1/resume", get(pages::handle_get_resume))
        .route("/api/v1/posts/:id/content", get(pages::handle_post_content))
        // Chat API
        .route("/api/v1/chat", post(chat::handle_mount))
        .route(
            "/api/v1/chat/:id",
            get(chat::handle_get_widget).delete(chat::handle_unmount),
        )
        .route("/api/v1/chat/:id/turns", post(chat::handle_send_turn))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .with_state(state)
}
