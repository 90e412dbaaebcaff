use serde::Serialize;

use crate::content::loader::{inline_content, ContentFetchError, FETCH_ERROR_DOCUMENT};
use crate::models::resume::BlogPost;

/// Display state of the selected post's body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum PostViewState {
    #[default]
    Idle,
    Loading,
    Loaded(String),
    Error(String),
}

impl PostViewState {
    /// Markdown to show, if the load has settled.
    pub fn text(&self) -> Option<&str> {
        match self {
            PostViewState::Loaded(text) | PostViewState::Error(text) => Some(text),
            PostViewState::Idle | PostViewState::Loading => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PostViewState::Loading)
    }
}

/// Identifies one outstanding fetch. Completions are only accepted for the
/// ticket issued by the most recent selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    post_id: String,
    generation: u64,
}

impl LoadTicket {
    pub fn post_id(&self) -> &str {
        &self.post_id
    }
}

/// Owns the selected post and its [`PostViewState`].
#[derive(Debug, Default)]
pub struct PostViewer {
    selected: Option<String>,
    state: PostViewState,
    generation: u64,
}

impl PostViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `post`. Inline posts settle immediately; remote posts move to
    /// `Loading` and return the ticket their fetch must complete with.
    pub fn select(&mut self, post: &BlogPost) -> Option<LoadTicket> {
        self.generation += 1;
        self.selected = Some(post.id.clone());

        match inline_content(post) {
            Some(text) => {
                self.state = PostViewState::Loaded(text);
                None
            }
            None => {
                self.state = PostViewState::Loading;
                Some(LoadTicket {
                    post_id: post.id.clone(),
                    generation: self.generation,
                })
            }
        }
    }

    /// Applies a finished fetch. Returns `false` and leaves state untouched
    /// when the ticket was superseded by a later selection or a clear.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, ContentFetchError>,
    ) -> bool {
        if ticket.generation != self.generation
            || self.selected.as_deref() != Some(ticket.post_id.as_str())
        {
            return false;
        }

        self.state = match result {
            Ok(text) => PostViewState::Loaded(text),
            Err(_) => PostViewState::Error(FETCH_ERROR_DOCUMENT.to_string()),
        };
        true
    }

    /// Drops the selection and any pending load.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.selected = None;
        self.state = PostViewState::Idle;
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> &PostViewState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::tests::post;

    #[test]
    fn test_inline_post_settles_without_ticket() {
        let mut viewer = PostViewer::new();
        assert!(viewer.select(&post("a", Some("body"), None)).is_none());
        assert_eq!(viewer.state(), &PostViewState::Loaded("body".to_string()));
    }

    #[test]
    fn test_remote_post_loads_then_settles() {
        let mut viewer = PostViewer::new();
        let ticket = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        assert!(viewer.state().is_loading());
        assert!(viewer.complete(ticket, Ok("remote".to_string())));
        assert_eq!(viewer.state().text(), Some("remote"));
    }

    #[test]
    fn test_failed_fetch_shows_error_document() {
        let mut viewer = PostViewer::new();
        let ticket = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        viewer.complete(ticket, Err(ContentFetchError::Status(500)));
        assert_eq!(
            viewer.state(),
            &PostViewState::Error(FETCH_ERROR_DOCUMENT.to_string())
        );
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut viewer = PostViewer::new();
        let ticket_a = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        let ticket_b = viewer.select(&post("b", None, Some("https://x/b.md"))).unwrap();

        assert!(!viewer.complete(ticket_a, Ok("A".to_string())));
        assert_eq!(viewer.selected(), Some("b"));
        assert!(viewer.state().is_loading());

        assert!(viewer.complete(ticket_b, Ok("B".to_string())));
        assert_eq!(viewer.state().text(), Some("B"));
    }

    #[test]
    fn test_stale_completion_after_switch_to_inline_post() {
        let mut viewer = PostViewer::new();
        let ticket_a = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        viewer.select(&post("b", Some("inline B"), None));
        assert!(!viewer.complete(ticket_a, Ok("A".to_string())));
        assert_eq!(viewer.state().text(), Some("inline B"));
    }

    #[test]
    fn test_reselecting_same_post_supersedes_old_ticket() {
        let mut viewer = PostViewer::new();
        let first = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        let second = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        assert!(!viewer.complete(first, Err(ContentFetchError::Status(500))));
        assert!(viewer.complete(second, Ok("retry worked".to_string())));
        assert_eq!(viewer.state().text(), Some("retry worked"));
    }

    #[test]
    fn test_clear_discards_pending_load() {
        let mut viewer = PostViewer::new();
        let ticket = viewer.select(&post("a", None, Some("https://x/a.md"))).unwrap();
        viewer.clear();
        assert!(!viewer.complete(ticket, Ok("A".to_string())));
        assert_eq!(viewer.state(), &PostViewState::Idle);
        assert_eq!(viewer.selected(), None);
    }
}
