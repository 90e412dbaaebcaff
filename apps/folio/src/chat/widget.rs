//! Chat widget: the transcript and single-flight state machine for one
//! mounted chat window.
//!
//! ```text
//! Uninitialized ──mount ok──▶ Ready ──begin_turn──▶ Streaming ──complete/fail──▶ Ready
//!       └──────mount err──▶ Failed (terminal)
//! ```
//!
//! The transcript is a sequence of immutable [`ChatMessage`] values. A delta
//! replaces the last element with an extended copy instead of mutating it.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::chat::session::ChatSession;
use crate::llm_client::{GenerateRequest, GenerationBackend, SessionInitError, TurnError};
use crate::models::chat::{ChatMessage, Role};
use crate::models::resume::ResumeDocument;

/// Replaces the model placeholder when a turn fails.
pub const APOLOGY: &str =
    "I'm sorry, I encountered an error connecting to the AI service. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TurnId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Streaming { turn: TurnId },
    Failed,
}

/// Why a submission was ignored. The transcript is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnRejected {
    #[error("Message is empty")]
    Blank,

    #[error("A reply is still streaming")]
    Busy,

    #[error("Chat is not available")]
    Unavailable,
}

/// An accepted turn, ready to be streamed by whoever owns the widget lock.
pub struct PendingTurn {
    pub id: TurnId,
    pub request: GenerateRequest,
    pub backend: Arc<dyn GenerationBackend>,
}

pub struct ChatWidget {
    state: SessionState,
    transcript: Vec<ChatMessage>,
    session: Option<ChatSession>,
    /// User text of the in-flight turn, committed to history on success.
    in_flight: Option<String>,
    next_turn: u64,
    torn_down: bool,
}

pub fn greeting_for(resume: &ResumeDocument) -> String {
    format!(
        "Hi! I'm an AI assistant. Ask me anything about {}'s experience, skills, or background!",
        resume.personal_info.first_name()
    )
}

impl ChatWidget {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            state: SessionState::Uninitialized,
            transcript: vec![ChatMessage::model(greeting)],
            session: None,
            in_flight: None,
            next_turn: 0,
            torn_down: false,
        }
    }

    /// Creates the session on first mount. Later calls are no-ops, so a widget
    /// never holds more than one session.
    pub fn mount<F>(&mut self, factory: F) -> SessionState
    where
        F: FnOnce() -> Result<ChatSession, SessionInitError>,
    {
        if self.state != SessionState::Uninitialized {
            return self.state;
        }

        match factory() {
            Ok(session) => {
                self.session = Some(session);
                self.state = SessionState::Ready;
            }
            Err(e) => {
                error!("Failed to initialize chat: {e}");
                self.state = SessionState::Failed;
            }
        }
        self.state
    }

    /// Accepts a user message: appends it and an empty model placeholder, and
    /// moves to `Streaming`. Rejections leave everything untouched.
    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, TurnRejected> {
        if self.torn_down {
            return Err(TurnRejected::Unavailable);
        }
        let session = match self.state {
            SessionState::Ready => self.session.as_ref().ok_or(TurnRejected::Unavailable)?,
            SessionState::Streaming { .. } => return Err(TurnRejected::Busy),
            SessionState::Uninitialized | SessionState::Failed => {
                return Err(TurnRejected::Unavailable)
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(TurnRejected::Blank);
        }

        let request = session.request_for(text);
        let backend = session.backend();

        self.next_turn += 1;
        let id = TurnId(self.next_turn);

        self.transcript.push(ChatMessage::user(text));
        self.transcript.push(ChatMessage::model(""));
        self.in_flight = Some(text.to_string());
        self.state = SessionState::Streaming { turn: id };

        info!("Chat turn {} accepted ({} chars)", id.0, text.len());

        Ok(PendingTurn {
            id,
            request,
            backend,
        })
    }

    /// Appends `delta` to the placeholder. Returns `false` when the turn is no
    /// longer current (settled, or the widget was torn down).
    pub fn apply_delta(&mut self, id: TurnId, delta: &str) -> bool {
        if !self.accepts(id) {
            return false;
        }
        if !delta.is_empty() {
            self.replace_last(|last| last.extended(delta));
        }
        true
    }

    /// Settles a successful turn and commits it to the session history.
    pub fn complete_turn(&mut self, id: TurnId) -> bool {
        if !self.accepts(id) {
            return false;
        }

        let reply = self
            .transcript
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default();
        if let (Some(session), Some(user_text)) = (self.session.as_mut(), self.in_flight.take()) {
            session.commit_exchange(user_text, reply);
        }
        self.state = SessionState::Ready;
        true
    }

    /// Settles a failed turn: the placeholder becomes [`APOLOGY`] and the
    /// exchange is not added to history.
    pub fn fail_turn(&mut self, id: TurnId, err: &TurnError) -> bool {
        if !self.accepts(id) {
            return false;
        }

        error!("Chat turn {} failed: {err}", id.0);
        self.replace_last(|last| last.with_text(APOLOGY));
        self.in_flight = None;
        self.state = SessionState::Ready;
        true
    }

    /// Marks the widget unmounted; late deltas and settlements are ignored.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Streaming { .. })
    }

    #[cfg(test)]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.transcript.last()
    }

    fn accepts(&self, id: TurnId) -> bool {
        !self.torn_down && self.state == SessionState::Streaming { turn: id }
    }

    fn replace_last(&mut self, f: impl FnOnce(&ChatMessage) -> ChatMessage) {
        if let Some(last) = self.transcript.pop() {
            debug_assert_eq!(last.role, Role::Model);
            self.transcript.push(f(&last));
        }
    }
}
