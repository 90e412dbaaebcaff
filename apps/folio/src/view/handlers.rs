//! Page and content handlers. Every page request starts from a fresh
//! [`Shell`] and replays the transitions that lead to the requested view.

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::markdown::render_markdown;
use crate::models::resume::{BlogPost, ResumeDocument};
use crate::state::AppState;
use crate::view::{Shell, Tab};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContentResponse {
    pub post_id: String,
    pub markdown: String,
    pub html: String,
}

fn find_post<'a>(state: &'a AppState, id: &str) -> Result<&'a BlogPost, AppError> {
    state
        .resume
        .find_post(id)
        .ok_or_else(|| AppError::NotFound(format!("Blog post {id} not found")))
}

fn render_page(state: &AppState, shell: &Shell) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.render(shell, &state.resume)?))
}

// ────────────────────────────────────────────────────────────────────────────
// Pages
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, &Shell::new())
}

/// GET /blog
pub async fn handle_blog_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let mut shell = Shell::new();
    shell.select_tab(Tab::Blog);
    render_page(&state, &shell)
}

/// GET /blog/:id
pub async fn handle_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let post = find_post(&state, &id)?;

    let mut shell = Shell::new();
    shell.select_tab(Tab::Blog);
    if let Some(ticket) = shell.select_post(post) {
        debug!("Loading remote body for post {}", ticket.post_id());
        let result = state.loader.fetch_content(post).await;
        shell.complete_load(ticket, result);
    }

    render_page(&state, &shell)
}

// ────────────────────────────────────────────────────────────────────────────
// JSON
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<ResumeDocument> {
    Json(state.resume.as_ref().clone())
}

/// GET /api/v1/posts/:id/content
pub async fn handle_post_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostContentResponse>, AppError> {
    let post = find_post(&state, &id)?;
    let markdown = state.loader.load_content(post).await;
    let html = render_markdown(&markdown);

    Ok(Json(PostContentResponse {
        post_id: post.id.clone(),
        markdown,
        html,
    }))
}
