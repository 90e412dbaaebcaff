//! Axum route handlers for the chat widget API.
//!
//! SSE event types emitted by `POST /api/v1/chat/:id/turns`:
//! - `delta`: incremental text: `{ "text": "..." }`
//! - `done`: final model message (with rendered `html`)
//! - `error`: the apology message that replaced the reply

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::chat::turn::{lock, spawn_turn, SharedWidget, TurnEvent};
use crate::chat::widget::{greeting_for, ChatWidget, SessionState};
use crate::errors::AppError;
use crate::markdown::render_markdown;
use crate::models::chat::ChatMessage;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub message: String,
}

/// A transcript entry plus its markdown rendered to HTML.
#[derive(Debug, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub html: String,
}

impl From<ChatMessage> for MessageView {
    fn from(message: ChatMessage) -> Self {
        let html = render_markdown(&message.text);
        Self { message, html }
    }
}

#[derive(Debug, Serialize)]
pub struct WidgetResponse {
    pub widget_id: Uuid,
    pub state: SessionState,
    pub busy: bool,
    pub transcript: Vec<MessageView>,
}

impl WidgetResponse {
    fn snapshot(widget_id: Uuid, widget: &ChatWidget) -> Self {
        Self {
            widget_id,
            state: widget.state(),
            busy: widget.is_busy(),
            transcript: widget
                .transcript()
                .iter()
                .cloned()
                .map(MessageView::from)
                .collect(),
        }
    }
}

fn find_widget(state: &AppState, id: Uuid) -> Result<SharedWidget, AppError> {
    state
        .widgets
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Chat widget {id} not found")))
}

fn to_sse(event: TurnEvent) -> Event {
    match event {
        TurnEvent::Delta { text } => Event::default()
            .event("delta")
            .data(serde_json::json!({ "text": text }).to_string()),
        TurnEvent::Done { message } => Event::default()
            .event("done")
            .data(serde_json::to_string(&MessageView::from(message)).unwrap_or_default()),
        TurnEvent::Failed { message } => Event::default()
            .event("error")
            .data(serde_json::to_string(&MessageView::from(message)).unwrap_or_default()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chat
pub async fn handle_mount(State(state): State<AppState>) -> (StatusCode, Json<WidgetResponse>) {
    let greeting = greeting_for(&state.resume);
    let (id, widget) = state.widgets.mount(greeting, &state.session_factory);
    let body = WidgetResponse::snapshot(id, &lock(&widget));
    (StatusCode::CREATED, Json(body))
}

/// GET /api/v1/chat/:id
pub async fn handle_get_widget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget = find_widget(&state, id)?;
    let body = WidgetResponse::snapshot(id, &lock(&widget));
    Ok(Json(body))
}

/// DELETE /api/v1/chat/:id
pub async fn handle_unmount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.widgets.unmount(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Chat widget {id} not found")))
    }
}

/// POST /api/v1/chat/:id/turns
/// Streams the reply as SSE.
pub async fn handle_send_turn(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TurnRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let widget = find_widget(&state, id)?;

    let pending = lock(&widget).begin_turn(&req.message).map_err(|rejected| {
        warn!("Chat turn rejected for widget {id}: {rejected}");
        AppError::from(rejected)
    })?;

    let mut events = spawn_turn(widget, pending);

    let sse_stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            yield Ok::<_, Infallible>(to_sse(event));
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
