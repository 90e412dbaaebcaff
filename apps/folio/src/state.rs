use std::sync::Arc;

use crate::chat::registry::WidgetRegistry;
use crate::chat::session::SessionFactory;
use crate::content::loader::PostContentLoader;
use crate::models::resume::ResumeDocument;
use crate::view::render::PageRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only for the life of the process.
    pub resume: Arc<ResumeDocument>,
    pub widgets: WidgetRegistry,
    /// Builds one chat session per mounted widget. Default: Gemini-backed.
    pub session_factory: SessionFactory,
    pub loader: PostContentLoader,
    pub pages: Arc<PageRenderer>,
}
