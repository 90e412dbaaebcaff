//! View shell: which of About / Blog list / Blog detail is visible, and the
//! post viewer that backs the detail view.
//!
//! `ViewState` transitions are pure. `Shell` pairs the view with the
//! [`PostViewer`] so leaving the detail view always discards its load state.

pub mod handlers;
pub mod render;

use serde::Serialize;

use crate::content::loader::ContentFetchError;
use crate::content::viewer::{LoadTicket, PostViewState, PostViewer};
use crate::models::resume::BlogPost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    About,
    Blog,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    About,
    BlogList,
    BlogDetail {
        post_id: String,
    },
}

impl ViewState {
    pub fn active_tab(&self) -> Tab {
        match self {
            ViewState::About => Tab::About,
            ViewState::BlogList | ViewState::BlogDetail { .. } => Tab::Blog,
        }
    }

    /// Selecting the tab that is already active changes nothing, so an open
    /// post stays open when "Blog" is selected again.
    pub fn select_tab(self, tab: Tab) -> Self {
        if self.active_tab() == tab {
            return self;
        }
        match tab {
            Tab::About => ViewState::About,
            Tab::Blog => ViewState::BlogList,
        }
    }

    pub fn select_post(self, post_id: &str) -> Self {
        ViewState::BlogDetail {
            post_id: post_id.to_string(),
        }
    }

    pub fn back(self) -> Self {
        ViewState::BlogList
    }

    pub fn is_detail(&self) -> bool {
        matches!(self, ViewState::BlogDetail { .. })
    }
}

#[derive(Debug, Default)]
pub struct Shell {
    view: ViewState,
    post: PostViewer,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            view: ViewState::default(),
            post: PostViewer::new(),
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        let next = std::mem::take(&mut self.view).select_tab(tab);
        if !next.is_detail() {
            self.post.clear();
        }
        self.view = next;
    }

    /// Opens `post`. Returns the ticket its remote fetch must complete with.
    pub fn select_post(&mut self, post: &BlogPost) -> Option<LoadTicket> {
        self.view = std::mem::take(&mut self.view).select_post(&post.id);
        self.post.select(post)
    }

    pub fn back(&mut self) {
        self.view = std::mem::take(&mut self.view).back();
        self.post.clear();
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, ContentFetchError>,
    ) -> bool {
        self.post.complete(ticket, result)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn post_state(&self) -> &PostViewState {
        self.post.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::tests::post;

    #[test]
    fn test_initial_view_is_about() {
        let shell = Shell::new();
        assert_eq!(shell.view(), &ViewState::About);
        assert_eq!(shell.post_state(), &PostViewState::Idle);
    }

    #[test]
    fn test_tab_selection_is_idempotent() {
        assert_eq!(ViewState::About.select_tab(Tab::About), ViewState::About);
        assert_eq!(ViewState::BlogList.select_tab(Tab::Blog), ViewState::BlogList);
        let detail = ViewState::About.select_post("1");
        assert_eq!(detail.clone().select_tab(Tab::Blog), detail);
    }

    #[test]
    fn test_tab_switches() {
        assert_eq!(ViewState::About.select_tab(Tab::Blog), ViewState::BlogList);
        assert_eq!(ViewState::BlogList.select_tab(Tab::About), ViewState::About);
        assert_eq!(
            ViewState::BlogList.select_post("1").select_tab(Tab::About),
            ViewState::About
        );
    }

    #[test]
    fn test_back_always_lands_on_blog_list() {
        for id in ["1", "2", "x"] {
            assert_eq!(ViewState::BlogList.select_post(id).back(), ViewState::BlogList);
        }
    }

    #[test]
    fn test_select_post_from_about_switches_to_blog_tab() {
        let view = ViewState::About.select_post("1");
        assert_eq!(view.active_tab(), Tab::Blog);
    }

    #[test]
    fn test_back_discards_post_state() {
        let mut shell = Shell::new();
        shell.select_post(&post("1", Some("body"), None));
        assert_eq!(shell.post_state().text(), Some("body"));

        shell.back();
        assert_eq!(shell.view(), &ViewState::BlogList);
        assert_eq!(shell.post_state(), &PostViewState::Idle);
    }

    #[test]
    fn test_leaving_detail_drops_pending_load() {
        let mut shell = Shell::new();
        let ticket = shell
            .select_post(&post("1", None, Some("https://x/1.md")))
            .unwrap();
        shell.select_tab(Tab::About);
        assert!(!shell.complete_load(ticket, Ok("late".to_string())));
        assert_eq!(shell.post_state(), &PostViewState::Idle);
    }

    #[test]
    fn test_switching_posts_ignores_earlier_fetch() {
        let mut shell = Shell::new();
        let ticket_a = shell
            .select_post(&post("a", None, Some("https://x/a.md")))
            .unwrap();
        let ticket_b = shell
            .select_post(&post("b", None, Some("https://x/b.md")))
            .unwrap();

        assert!(!shell.complete_load(ticket_a, Ok("A".to_string())));
        assert!(shell.post_state().is_loading());
        assert!(shell.complete_load(ticket_b, Err(ContentFetchError::Status(404))));
        assert_eq!(
            shell.view(),
            &ViewState::BlogDetail {
                post_id: "b".to_string()
            }
        );
        assert!(matches!(shell.post_state(), PostViewState::Error(_)));
    }
}
